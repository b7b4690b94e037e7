use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub assistant: AssistantDefaults,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub sanitizer: SanitizerSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssistantDefaults {
    pub model: Option<String>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    /// Which backend to use when the CLI doesn't say: "gemini" or "groq".
    #[serde(default = "ProvidersConfig::default_provider")]
    pub default: String,
    pub gemini: ProviderConfig,
    pub groq: ProviderConfig,
}

impl ProvidersConfig {
    fn default_provider() -> String {
        "groq".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Transcript sanitation settings.
///
/// `keep_last_n` is validated where the sanitizer is built; a zero here
/// aborts session start instead of being silently patched up.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SanitizerSettings {
    #[serde(default = "SanitizerSettings::default_keep_last_n")]
    pub keep_last_n: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer_marker: Option<String>,
}

impl Default for SanitizerSettings {
    fn default() -> Self {
        Self {
            keep_last_n: Self::default_keep_last_n(),
            fallback_question: None,
            disclaimer_marker: None,
        }
    }
}

impl SanitizerSettings {
    const fn default_keep_last_n() -> usize {
        1
    }
}

const CONFIG_TEMPLATE: &str = r#"{
  "assistant": {
    "model": null,
    "temperature": 0.25,
    "history_limit": 20
  },
  "providers": {
    "default": "groq",
    "gemini": {
      "api_key": "your-gemini-api-key-here"
    },
    "groq": {
      "api_key": "your-groq-api-key-here"
    }
  },
  "sanitizer": {
    "keep_last_n": 1
  }
}"#;

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'medichat init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_json::from_str(&content)?;

        Ok(config)
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("medichat"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;

        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("   1. Edit the config file and add your Gemini and/or Groq API key");
        println!("   2. Pick the default provider (\"gemini\" or \"groq\")");
        println!("   3. Run 'medichat chat' to start a conversation");
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::expect_used, reason = "template must stay parseable")]
    fn template_parses_into_config() {
        let config: Config = serde_json::from_str(CONFIG_TEMPLATE).expect("template is valid");
        assert_eq!(config.providers.default, "groq");
        assert_eq!(config.sanitizer.keep_last_n, 1);
        assert!(config.assistant.model.is_none());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "fixture json is well formed")]
    fn sanitizer_section_is_optional() {
        let raw = r#"{
            "assistant": {"model": "x", "temperature": 0.5},
            "providers": {
                "gemini": {"api_key": "a"},
                "groq": {"api_key": "b"}
            }
        }"#;
        let config: Config = serde_json::from_str(raw).expect("valid config");
        assert_eq!(config.sanitizer.keep_last_n, 1);
        assert_eq!(config.providers.default, "groq");
    }
}
