//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`. Shared wiring (config load, provider selection)
//! lives here.

use std::sync::Arc;

use medichat_config::Config;
use medichat_conversation::{QuestionPolicy, SanitizerConfig};
use medichat_core::LLMProvider;
use medichat_providers::{GeminiProvider, GroqProvider};
use tracing::info;

mod chat;
mod init;
mod triage;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use init::InitStrategy;
pub use triage::{TriageInput, TriageStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type, enabling type-safe parameter
/// passing without runtime casting or boxing. Calls are monomorphized at
/// compile time.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Components every provider-backed command needs.
pub struct CommonComponents {
    pub config: Config,
    pub provider: Arc<dyn LLMProvider>,
    pub model: String,
}

/// Load configuration and construct the chosen provider.
///
/// The provider is built exactly once here and injected everywhere else;
/// no module holds its own client handle.
pub fn init_common_components(
    provider_choice: Option<&str>,
    model_override: Option<String>,
) -> anyhow::Result<CommonComponents> {
    let config = Config::load()?;
    info!("loaded config from ~/medichat/config.json");

    let choice = provider_choice
        .map_or_else(|| config.providers.default.clone(), str::to_string)
        .to_lowercase();

    let provider: Arc<dyn LLMProvider> = if choice.starts_with("gemini") {
        Arc::new(GeminiProvider::new(config.providers.gemini.api_key.clone()))
    } else {
        Arc::new(GroqProvider::new(config.providers.groq.api_key.clone()))
    };

    let model = model_override
        .or_else(|| config.assistant.model.clone())
        .unwrap_or_else(|| provider.get_default_model().to_string());

    info!("using provider '{choice}' with model '{model}'");

    Ok(CommonComponents {
        config,
        provider,
        model,
    })
}

/// Build the sanitizer settings from config.
///
/// An invalid `keep_last_n` aborts right here, before any session exists.
pub fn build_sanitizer_config(config: &Config) -> anyhow::Result<SanitizerConfig> {
    let mut policy = QuestionPolicy::default();
    if let Some(marker) = &config.sanitizer.disclaimer_marker {
        policy.disclaimer_marker.clone_from(marker);
    }
    if let Some(question) = &config.sanitizer.fallback_question {
        policy.fallback_question.clone_from(question);
    }

    SanitizerConfig::new(config.sanitizer.keep_last_n, policy)
        .map_err(|e| anyhow::anyhow!("invalid sanitizer configuration: {e}"))
}
