use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use medichat_core::{ChatMessage, LLMProvider, LLMResponse, ProviderError, Usage};

use crate::retry::retry_with_backoff;
use crate::{map_status, map_transport};

const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Low temperature keeps medical phrasing conservative.
const DEFAULT_TEMPERATURE: f32 = 0.25;

const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(2),
    Duration::from_secs(4),
    Duration::from_secs(8),
];

/// Groq chat-completions client (OpenAI-compatible wire format).
pub struct GroqProvider {
    client: Client,
    api_key: String,
    base_url: String,
    temperature: f32,
}

impl GroqProvider {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        info!("creating GroqProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn try_send(&self, request: &Value) -> Result<LLMResponse, ProviderError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| map_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, body));
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        extract_reply(&value)
    }
}

fn extract_reply(value: &Value) -> Result<LLMResponse, ProviderError> {
    let content = value["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse("missing message content".to_string()))?
        .trim()
        .to_string();

    let usage = value["usage"].as_object().map(|u| Usage {
        prompt_tokens: u32::try_from(u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0))
            .unwrap_or(0),
        completion_tokens: u32::try_from(
            u.get("completion_tokens").and_then(Value::as_u64).unwrap_or(0),
        )
        .unwrap_or(0),
        total_tokens: u32::try_from(u.get("total_tokens").and_then(Value::as_u64).unwrap_or(0))
            .unwrap_or(0),
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for GroqProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<LLMResponse, ProviderError> {
        let request = json!({
            "model": model,
            "messages": messages,
            "temperature": self.temperature,
        });

        info!("sending request to Groq API: model={model}");

        let response = retry_with_backoff(|| self.try_send(&request), &RETRY_DELAYS).await?;

        info!("received response from Groq API");
        Ok(response)
    }

    fn get_default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medichat_core::Role;

    #[test]
    #[expect(clippy::unwrap_used, reason = "fixture json is well formed")]
    fn extract_reply_reads_first_choice() {
        let value = json!({
            "choices": [{"message": {"role": "assistant", "content": " Hello there. "}}],
            "usage": {"prompt_tokens": 20, "completion_tokens": 4, "total_tokens": 24},
        });
        let reply = extract_reply(&value).unwrap();
        assert_eq!(reply.content, "Hello there.");
        assert_eq!(reply.usage.unwrap().prompt_tokens, 20);
    }

    #[test]
    fn missing_choices_is_invalid_response() {
        let value = json!({"choices": []});
        assert!(matches!(
            extract_reply(&value),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn request_body_serializes_roles_lowercase() {
        let messages = vec![ChatMessage::new(Role::System, "preamble")];
        let request = json!({"messages": messages});
        assert_eq!(request["messages"][0]["role"], "system");
    }
}
