//! Word-count gate deciding when a conversation is triage-ready.

use medichat_core::{ChatMessage, Role};

/// Default minimum words across user turns before offering a report.
pub const DEFAULT_MIN_WORDS: usize = 15;

/// Total whitespace-separated words across all user turns.
#[must_use]
pub fn user_word_count(messages: &[ChatMessage]) -> usize {
    messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.split_whitespace().count())
        .sum()
}

/// Whether the user has described enough for a meaningful report.
///
/// A crude gate: the model can't summarize symptoms that were never
/// described, so short conversations don't get a triage button.
#[must_use]
pub fn is_ready(messages: &[ChatMessage], min_words: usize) -> bool {
    user_word_count(messages) >= min_words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_user_words() {
        let messages = vec![
            ChatMessage::new(Role::System, "one two three four"),
            ChatMessage::new(Role::User, "my throat hurts"),
            ChatMessage::new(Role::Assistant, "since when exactly did it start"),
            ChatMessage::new(Role::User, "two days ago"),
        ];
        assert_eq!(user_word_count(&messages), 6);
    }

    #[test]
    fn gate_opens_at_threshold() {
        let messages = vec![ChatMessage::new(Role::User, "a b c d e")];
        assert!(is_ready(&messages, 5));
        assert!(!is_ready(&messages, 6));
    }

    #[test]
    fn empty_history_is_never_ready() {
        assert!(!is_ready(&[], 1));
        assert!(is_ready(&[], 0));
    }
}
