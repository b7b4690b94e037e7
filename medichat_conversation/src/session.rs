//! Per-session conversation state.
//!
//! A session owns its transcript exclusively. It is created seeded with the
//! system turn, grows monotonically turn by turn, and is discarded and
//! re-seeded on explicit reset.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use medichat_core::{ChatMessage, Role};

#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub id: Uuid,
    pub name: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create a session seeded with the system instruction preamble.
    #[must_use]
    pub fn new(system_prompt: &str) -> Self {
        let now = Utc::now();
        let mut session = Self {
            id: Uuid::now_v7(),
            name: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        session.seed(system_prompt);
        session
    }

    #[must_use]
    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn add_message(&mut self, role: Role, content: String) {
        self.messages.push(ChatMessage { role, content });
        self.updated_at = Utc::now();
    }

    /// Last assistant turn, if any. This is what the triage layer reads.
    #[must_use]
    pub fn last_assistant_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Completed user/assistant exchanges so far.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Discard the transcript and start over with the system turn.
    pub fn reset(&mut self, system_prompt: &str) {
        self.messages.clear();
        self.seed(system_prompt);
    }

    fn seed(&mut self, system_prompt: &str) {
        if !system_prompt.is_empty() {
            self.messages
                .push(ChatMessage::new(Role::System, system_prompt));
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_seeded_with_system_turn() {
        let session = ConversationSession::new("You are a medical assistant.");
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages[0].role, Role::System);
    }

    #[test]
    fn empty_prompt_seeds_nothing() {
        let session = ConversationSession::new("");
        assert!(session.is_empty());
    }

    #[test]
    fn reset_discards_turns_and_reseeds() {
        let mut session = ConversationSession::new("preamble");
        session.add_message(Role::User, "I have a headache".to_string());
        session.add_message(Role::Assistant, "Since when?".to_string());
        assert_eq!(session.turn_count(), 1);

        session.reset("preamble");
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.turn_count(), 0);
        assert_eq!(session.messages[0].role, Role::System);
    }

    #[test]
    fn last_assistant_reply_skips_user_tail() {
        let mut session = ConversationSession::new("preamble");
        session.add_message(Role::User, "hello".to_string());
        session.add_message(Role::Assistant, "Hi, what brings you in?".to_string());
        session.add_message(Role::User, "my knee".to_string());

        assert_eq!(
            session.last_assistant_reply(),
            Some("Hi, what brings you in?")
        );
    }
}
