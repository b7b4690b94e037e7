//! Turn processing for the medical chat assistant.
//!
//! The manager owns one session and drives each turn through a fixed,
//! synchronous pipeline: append the user turn, obtain a candidate reply
//! from the injected provider (or a canned fallback when the provider is
//! unreachable), then sanitize and persist the result. Sanitation order is
//! fixed: duplicate collapse, then question enforcement, then the append
//! guard.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use medichat_core::{LLMProvider, ProviderError, Role, SessionStorage};

use crate::history::{HistoryConfig, HistoryWindow};
use crate::question::enforce_question;
use crate::sanitizer::{SanitizeError, SanitizerConfig, append_reply, collapse_duplicates};
use crate::session::ConversationSession;

/// Instruction preamble for the assistant.
pub const SYSTEM_PROMPT: &str = "You are a friendly, helpful medical chat assistant. Speak naturally.\n\
     Guidelines:\n\
     - Use conversational language (short paragraphs or bullets if needed).\n\
     - Ask 1 short, gentle clarifying question at the end of your reply to invite more details,\n\
     \x20 e.g. 'Can you tell me more about your symptoms?' or 'When did this start?'.\n\
     - Offer simple non-prescriptive suggestions when appropriate.\n\
     - Recommend seeing a doctor only if symptoms are severe, sudden, spreading, or persistent.\n\
     - Never give a formal medical diagnosis or prescribe medication.\n\
     - If health advice is discussed, end with: 'This is general information and not a \
     substitute for professional medical advice.'\n";

/// Generic apology when the provider fails for a reason we can't name.
const FALLBACK_GENERIC: &str =
    "Sorry — I couldn't reach the model right now. Please try again in a moment.";

const FALLBACK_PERMISSION: &str = "I couldn't reach the model due to a permission issue. \
     Try switching the model or network. \
     This is general information and not a substitute for professional medical advice.";

const FALLBACK_CONNECTION: &str = "I couldn't connect to the model due to a connectivity error. \
     Please try again later. \
     This is general information and not a substitute for professional medical advice.";

/// Configuration for one conversation.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Session identifier (persists across turns)
    pub session_id: Uuid,
    pub session_name: Option<String>,
    /// Model to use for completions
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub history: HistoryConfig,
    pub sanitizer: SanitizerConfig,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            session_id: Uuid::now_v7(),
            session_name: None,
            model: "llama-3.3-70b-versatile".to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            temperature: 0.25,
            history: HistoryConfig::default(),
            sanitizer: SanitizerConfig::default(),
        }
    }
}

impl ConversationConfig {
    #[must_use]
    pub const fn with_session_id(mut self, id: Uuid) -> Self {
        self.session_id = id;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = prompt;
        self
    }

    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: SanitizerConfig) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    #[must_use]
    pub const fn with_history_limit(mut self, limit: usize) -> Self {
        self.history.max_messages = limit;
        self
    }
}

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("sanitizer error: {0}")]
    Sanitize(#[from] SanitizeError),

    #[error("session storage error: {0}")]
    Session(String),

    #[error("user message is empty")]
    EmptyInput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a session currently is in its turn lifecycle.
///
/// `AwaitingReply` is the only state in which the provider is invoked;
/// `Sanitizing` covers the fixed collapse -> enforce -> append sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    AwaitingReply,
    Sanitizing,
}

/// Result of processing one user turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Finalized assistant reply (post question enforcement).
    pub response: String,
    pub usage: Option<TurnUsage>,
    pub turn_number: usize,
}

#[derive(Debug, Clone)]
pub struct TurnUsage {
    pub prompt: u32,
    pub completion: u32,
    pub total: u32,
}

/// Canned reply substituted when the provider call fails.
///
/// The sanitizer makes no distinction between a genuine model reply and one
/// of these; they go through question enforcement and the append guard like
/// anything else.
#[must_use]
pub fn fallback_reply(err: &ProviderError) -> String {
    match err {
        ProviderError::Permission(_) => FALLBACK_PERMISSION.to_string(),
        ProviderError::Connection(_) => FALLBACK_CONNECTION.to_string(),
        ProviderError::InvalidResponse(_) | ProviderError::Request(_) => {
            FALLBACK_GENERIC.to_string()
        }
    }
}

pub struct ConversationManager<P = Arc<dyn LLMProvider>, S = Arc<dyn SessionStorage>>
where
    P: Send + Sync,
    S: Send + Sync,
{
    provider: P,
    storage: S,
    config: ConversationConfig,
    session: ConversationSession,
    phase: TurnPhase,
}

impl<P, S> ConversationManager<P, S>
where
    P: LLMProvider + Send + Sync,
    S: SessionStorage + Send + Sync,
{
    /// Create a manager, loading (or seeding) the session from storage.
    ///
    /// The loaded transcript is sanitized defensively so that duplicates
    /// persisted by older code don't survive a restart.
    pub async fn new(
        provider: P,
        storage: S,
        config: ConversationConfig,
    ) -> Result<Self, ConversationError> {
        info!("starting conversation session {}", config.session_id);

        let stored = storage
            .get_or_create(&config.session_id)
            .await
            .map_err(|e| ConversationError::Session(e.to_string()))?;

        let mut session = ConversationSession {
            id: stored.id,
            name: config.session_name.clone(),
            messages: collapse_duplicates(&stored.messages, config.sanitizer.keep_last_n())?,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        };
        if session.is_empty() && !config.system_prompt.is_empty() {
            session.add_message(Role::System, config.system_prompt.clone());
        }

        Ok(Self {
            provider,
            storage,
            config,
            session,
            phase: TurnPhase::Idle,
        })
    }

    /// Process one user turn to completion: submit, generate, sanitize,
    /// append, persist. Synchronous relative to the provider call; one turn
    /// in flight per session.
    pub async fn process_turn(&mut self, user_input: &str) -> Result<TurnResult, ConversationError> {
        let user_input = user_input.trim();
        if user_input.is_empty() {
            return Err(ConversationError::EmptyInput);
        }

        self.phase = TurnPhase::AwaitingReply;
        self.session
            .add_message(Role::User, user_input.to_string());

        let window = HistoryWindow::new(self.config.history.clone());
        let context = window.select(&self.session.messages);

        debug!(
            "requesting reply: model={} context={} messages",
            self.config.model,
            context.len()
        );

        let (candidate, usage) = match self.provider.chat(&context, &self.config.model).await {
            Ok(reply) => (reply.content, reply.usage),
            Err(e) => {
                warn!("provider call failed, substituting fallback: {e}");
                (fallback_reply(&e), None)
            }
        };

        self.phase = TurnPhase::Sanitizing;
        let keep_last_n = self.config.sanitizer.keep_last_n();
        let collapsed = collapse_duplicates(&self.session.messages, keep_last_n)?;
        let finalized = enforce_question(&candidate, self.config.sanitizer.question())?;
        self.session.messages = append_reply(collapsed, finalized.clone());
        self.session.updated_at = chrono::Utc::now();

        self.storage
            .replace(&self.config.session_id, &self.session.messages)
            .await
            .map_err(|e| ConversationError::Session(e.to_string()))?;

        self.phase = TurnPhase::Idle;
        let turn_number = self.session.turn_count();
        debug!("turn {turn_number} completed");

        Ok(TurnResult {
            response: finalized,
            usage: usage.map(|u| TurnUsage {
                prompt: u.prompt_tokens,
                completion: u.completion_tokens,
                total: u.total_tokens,
            }),
            turn_number,
        })
    }

    /// Discard the conversation and start over with the system turn.
    pub async fn reset(&mut self) -> Result<(), ConversationError> {
        info!("resetting session {}", self.config.session_id);
        self.session.reset(&self.config.system_prompt);

        self.storage
            .reset(&self.config.session_id)
            .await
            .map_err(|e| ConversationError::Session(e.to_string()))?;
        self.storage
            .replace(&self.config.session_id, &self.session.messages)
            .await
            .map_err(|e| ConversationError::Session(e.to_string()))?;

        self.phase = TurnPhase::Idle;
        Ok(())
    }

    #[must_use]
    pub const fn session(&self) -> &ConversationSession {
        &self.session
    }

    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    #[must_use]
    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_is_valid() {
        let config = ConversationConfig::default();
        assert!(!config.model.is_empty());
        assert_eq!(config.sanitizer.keep_last_n(), 1);
        assert!(config.system_prompt.contains("medical"));
    }

    #[test]
    fn fallback_replies_name_the_failure() {
        let permission = fallback_reply(&ProviderError::Permission("403".into()));
        assert!(permission.contains("permission"));
        assert!(permission.contains("This is general information"));

        let connection = fallback_reply(&ProviderError::Connection("timeout".into()));
        assert!(connection.contains("connect"));

        let generic = fallback_reply(&ProviderError::Request("boom".into()));
        assert!(generic.contains("try again"));
    }
}
