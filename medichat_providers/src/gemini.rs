use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use medichat_core::{ChatMessage, LLMProvider, LLMResponse, ProviderError, Role, Usage};

use crate::retry::retry_with_backoff;
use crate::{map_status, map_transport};

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Backoff schedule for transient failures: 2s, 4s, 8s.
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(2),
    Duration::from_secs(4),
    Duration::from_secs(8),
];

/// Gemini text-generation client.
///
/// Gemini's generate endpoint takes a single prompt rather than a message
/// list, so the transcript is flattened into labeled blocks with a trailing
/// `Assistant:` cue.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        info!("creating GeminiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn try_send(&self, prompt: &str, model: &str) -> Result<LLMResponse, ProviderError> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
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

/// Flatten the transcript into a labeled prompt ending with an
/// `Assistant:` cue for the model to complete.
#[must_use]
pub fn flatten_history(messages: &[ChatMessage]) -> String {
    let mut parts = Vec::with_capacity(messages.len());
    for m in messages {
        let label = match m.role {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        parts.push(format!("{label}: {}", m.content));
    }
    format!("{}\n\nAssistant:", parts.join("\n\n"))
}

fn extract_reply(value: &Value) -> Result<LLMResponse, ProviderError> {
    let text = value["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| {
            ProviderError::InvalidResponse("missing candidate text".to_string())
        })?
        .trim();

    // Safety-filtered generations come back with empty text.
    let content = if text.is_empty() {
        "I couldn't generate a safe response.".to_string()
    } else {
        text.to_string()
    };

    let usage = value["usageMetadata"].as_object().map(|u| Usage {
        prompt_tokens: u32::try_from(u.get("promptTokenCount").and_then(Value::as_u64).unwrap_or(0))
            .unwrap_or(0),
        completion_tokens: u32::try_from(
            u.get("candidatesTokenCount").and_then(Value::as_u64).unwrap_or(0),
        )
        .unwrap_or(0),
        total_tokens: u32::try_from(u.get("totalTokenCount").and_then(Value::as_u64).unwrap_or(0))
            .unwrap_or(0),
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<LLMResponse, ProviderError> {
        let prompt = flatten_history(messages);
        info!("sending request to Gemini API: model={model}");

        let response =
            retry_with_backoff(|| self.try_send(&prompt, model), &RETRY_DELAYS).await?;

        info!("received response from Gemini API");
        Ok(response)
    }

    fn get_default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_labels_roles_and_appends_cue() {
        let messages = vec![
            ChatMessage::new(Role::System, "Be helpful."),
            ChatMessage::new(Role::User, "My head hurts."),
            ChatMessage::new(Role::Assistant, "Since when?"),
        ];
        let prompt = flatten_history(&messages);
        assert_eq!(
            prompt,
            "System: Be helpful.\n\nUser: My head hurts.\n\nAssistant: Since when?\n\nAssistant:"
        );
    }

    #[test]
    #[expect(clippy::unwrap_used, reason = "fixture json is well formed")]
    fn extract_reply_reads_candidate_text() {
        let value = json!({
            "candidates": [{"content": {"parts": [{"text": "  Rest and hydrate.  "}]}}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 5, "totalTokenCount": 17},
        });
        let reply = extract_reply(&value).unwrap();
        assert_eq!(reply.content, "Rest and hydrate.");
        let usage = reply.usage.unwrap();
        assert_eq!(usage.total_tokens, 17);
    }

    #[test]
    #[expect(clippy::unwrap_used, reason = "fixture json is well formed")]
    fn empty_candidate_text_becomes_safe_fallback() {
        let value = json!({
            "candidates": [{"content": {"parts": [{"text": ""}]}}],
        });
        let reply = extract_reply(&value).unwrap();
        assert_eq!(reply.content, "I couldn't generate a safe response.");
    }

    #[test]
    fn missing_candidates_is_invalid_response() {
        let value = json!({"candidates": []});
        assert!(matches!(
            extract_reply(&value),
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
