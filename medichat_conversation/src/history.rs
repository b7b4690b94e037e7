//! Context window selection for provider calls.
//!
//! The stored transcript grows without bound; the slice replayed to the
//! model does not. The window keeps the system turn plus the most recent
//! messages, leaving the canonical transcript untouched.

use medichat_core::{ChatMessage, Role};

/// How much of the transcript to replay to the provider.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of non-system messages sent as context.
    pub max_messages: usize,
    /// Always include the leading system turn when present.
    pub keep_system_turn: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_messages: 20,
            keep_system_turn: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryWindow {
    config: HistoryConfig,
}

impl HistoryWindow {
    #[must_use]
    pub const fn new(config: HistoryConfig) -> Self {
        Self { config }
    }

    /// Select the messages to include as provider context.
    ///
    /// The system turn (when present and configured) always comes first;
    /// the rest are the most recent `max_messages` non-system turns in
    /// their original order.
    #[must_use]
    pub fn select(&self, messages: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut selected = Vec::new();

        if self.config.keep_system_turn {
            if let Some(system) = messages.iter().find(|m| m.role == Role::System) {
                selected.push(system.clone());
            }
        }

        let rest: Vec<&ChatMessage> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .collect();
        let start = rest.len().saturating_sub(self.config.max_messages);
        selected.extend(rest[start..].iter().map(|m| (*m).clone()));

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(turns: usize) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::new(Role::System, "preamble")];
        for i in 0..turns {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            messages.push(ChatMessage::new(role, format!("turn {i}")));
        }
        messages
    }

    #[test]
    fn keeps_system_turn_and_recent_tail() {
        let window = HistoryWindow::new(HistoryConfig {
            max_messages: 4,
            keep_system_turn: true,
        });
        let selected = window.select(&transcript(10));

        assert_eq!(selected.len(), 5);
        assert_eq!(selected[0].role, Role::System);
        assert_eq!(selected[1].content, "turn 6");
        assert_eq!(selected[4].content, "turn 9");
    }

    #[test]
    fn short_transcript_passes_through() {
        let window = HistoryWindow::default();
        let messages = transcript(3);
        assert_eq!(window.select(&messages).len(), messages.len());
    }

    #[test]
    fn system_turn_can_be_excluded() {
        let window = HistoryWindow::new(HistoryConfig {
            max_messages: 2,
            keep_system_turn: false,
        });
        let selected = window.select(&transcript(6));
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|m| m.role != Role::System));
    }
}
