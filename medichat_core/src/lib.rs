#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Shared types and trait seams for the medichat workspace.
//!
//! Everything that crosses a crate boundary lives here: the chat transcript
//! types, the text-generation capability (`LLMProvider`), and the session
//! storage slot. Provider implementations and the sanitation pipeline build
//! on these without depending on each other.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn of the conversation transcript.
///
/// The transcript is replayed verbatim to the provider, so insertion order
/// is meaningful. User and assistant turns never carry empty content; the
/// system turn holds the instruction preamble.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Failure modes of a text-generation provider.
///
/// `Permission` and `Connection` are the two kinds the assistant turns into
/// canned fallback replies; everything else is surfaced generically.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rejected the request (permission): {0}")]
    Permission(String),

    #[error("could not reach the provider: {0}")]
    Connection(String),

    #[error("malformed provider response: {0}")]
    InvalidResponse(String),

    #[error("provider request failed: {0}")]
    Request(String),
}

impl ProviderError {
    /// Whether retrying the same request could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Request(_))
    }
}

/// The text-generation capability.
///
/// Implementations are constructed once at process start and injected;
/// nothing in the workspace holds a hidden global client.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<LLMResponse, ProviderError>;

    fn get_default_model(&self) -> &str;
}

#[async_trait]
impl<T: LLMProvider + ?Sized> LLMProvider for std::sync::Arc<T> {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
    ) -> Result<LLMResponse, ProviderError> {
        (**self).chat(messages, model).await
    }

    fn get_default_model(&self) -> &str {
        (**self).get_default_model()
    }
}

/// One stored conversation: the session slot's value.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Opaque key-value slot holding one transcript per session.
///
/// Stores replace a session's messages wholesale; partial mutation happens
/// only through the sanitizer's returned history.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get_or_create(&self, id: &Uuid) -> anyhow::Result<Session>;

    async fn replace(&self, id: &Uuid, messages: &[ChatMessage]) -> anyhow::Result<()>;

    /// Drop the slot entirely; the next `get_or_create` starts fresh.
    async fn reset(&self, id: &Uuid) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: SessionStorage + ?Sized> SessionStorage for std::sync::Arc<T> {
    async fn get_or_create(&self, id: &Uuid) -> anyhow::Result<Session> {
        (**self).get_or_create(id).await
    }

    async fn replace(&self, id: &Uuid, messages: &[ChatMessage]) -> anyhow::Result<()> {
        (**self).replace(id, messages).await
    }

    async fn reset(&self, id: &Uuid) -> anyhow::Result<()> {
        (**self).reset(id).await
    }
}
