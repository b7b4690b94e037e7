//! History normalization: duplicate collapse and the append guard.
//!
//! The model occasionally produces (or retried calling code re-submits) the
//! same assistant reply twice in a row. These passes keep the stored
//! transcript canonical: no immediate assistant repeats anywhere, a capped
//! trailing run, and no double-append of an identical finalized reply.

use medichat_core::{ChatMessage, Role};
use thiserror::Error;

use crate::question::QuestionPolicy;

#[derive(Debug, Error)]
pub enum SanitizeError {
    /// `keep_last_n = 0` would delete the only trailing assistant reply.
    #[error("keep_last_n must be at least 1 (got {0})")]
    InvalidConfig(usize),

    #[error("candidate reply is empty")]
    EmptyReply,
}

/// Settings for the sanitation pipeline.
///
/// Construction validates `keep_last_n`; an invalid value aborts session
/// initialization rather than degrading into unbounded duplicate retention.
#[derive(Debug, Clone)]
pub struct SanitizerConfig {
    keep_last_n: usize,
    question: QuestionPolicy,
}

impl SanitizerConfig {
    pub fn new(keep_last_n: usize, question: QuestionPolicy) -> Result<Self, SanitizeError> {
        if keep_last_n == 0 {
            return Err(SanitizeError::InvalidConfig(keep_last_n));
        }
        Ok(Self {
            keep_last_n,
            question,
        })
    }

    #[must_use]
    pub const fn keep_last_n(&self) -> usize {
        self.keep_last_n
    }

    #[must_use]
    pub const fn question(&self) -> &QuestionPolicy {
        &self.question
    }
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            keep_last_n: 1,
            question: QuestionPolicy::default(),
        }
    }
}

/// Remove redundant assistant repeats, then cap the trailing run.
///
/// Runs [`collapse_immediate`] followed by [`cap_trailing_run`]. The output
/// preserves the relative order of surviving turns and is never longer than
/// the input. Applying it twice yields the same result as applying it once.
pub fn collapse_duplicates(
    messages: &[ChatMessage],
    keep_last_n: usize,
) -> Result<Vec<ChatMessage>, SanitizeError> {
    if keep_last_n == 0 {
        return Err(SanitizeError::InvalidConfig(keep_last_n));
    }
    let mut collapsed = collapse_immediate(messages);
    cap_trailing_run(&mut collapsed, keep_last_n);
    Ok(collapsed)
}

/// Step 1: single left-to-right pass dropping immediate assistant repeats.
///
/// A turn is dropped iff it is an assistant turn, the previously *emitted*
/// turn is an assistant turn, and their contents are byte-equal. User and
/// system turns survive even when textually identical to a neighbor. No
/// look-ahead, no reordering.
#[must_use]
pub fn collapse_immediate(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut collapsed: Vec<ChatMessage> = Vec::with_capacity(messages.len());
    for msg in messages {
        let duplicate = collapsed.last().is_some_and(|prev| {
            msg.role == Role::Assistant
                && prev.role == Role::Assistant
                && msg.content == prev.content
        });
        if !duplicate {
            collapsed.push(msg.clone());
        }
    }
    collapsed
}

/// Step 2: cap the run of trailing assistant turns identical to the last.
///
/// Removes turns from the end inward until the run length is `keep_last_n`,
/// keeping the earliest members of the run. After step 1 such a run is
/// normally length 1; histories persisted before sanitation existed can
/// still carry longer ones.
pub fn cap_trailing_run(messages: &mut Vec<ChatMessage>, keep_last_n: usize) {
    if messages.len() < 2 {
        return;
    }
    let last = match messages.last() {
        Some(m) if m.role == Role::Assistant => m.content.clone(),
        _ => return,
    };
    let run = messages
        .iter()
        .rev()
        .take_while(|m| m.role == Role::Assistant && m.content == last)
        .count();
    if run > keep_last_n {
        messages.truncate(messages.len() - (run - keep_last_n));
    }
}

/// Append the finalized assistant reply unless it already sits at the tail.
///
/// Must run on the post-transform reply: equality is compared after question
/// enforcement so that two candidates differing only pre-transform are
/// judged on what would actually be stored.
#[must_use]
pub fn append_reply(mut messages: Vec<ChatMessage>, finalized: String) -> Vec<ChatMessage> {
    let already_last = messages
        .last()
        .is_some_and(|m| m.role == Role::Assistant && m.content == finalized);
    if !already_last {
        messages.push(ChatMessage::new(Role::Assistant, finalized));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant(content: &str) -> ChatMessage {
        ChatMessage::new(Role::Assistant, content)
    }

    fn user(content: &str) -> ChatMessage {
        ChatMessage::new(Role::User, content)
    }

    #[expect(clippy::unwrap_used, reason = "test inputs are valid")]
    fn collapse(messages: &[ChatMessage], keep_last_n: usize) -> Vec<ChatMessage> {
        collapse_duplicates(messages, keep_last_n).unwrap()
    }

    #[test]
    fn empty_history_unchanged() {
        assert!(collapse(&[], 1).is_empty());
    }

    #[test]
    fn zero_keep_last_n_rejected() {
        let result = collapse_duplicates(&[user("hi")], 0);
        assert!(matches!(result, Err(SanitizeError::InvalidConfig(0))));
    }

    #[test]
    fn immediate_assistant_repeats_collapse_mid_history() {
        // Run isn't trailing here (the user turn is last), so only the
        // immediate-duplicate pass fires.
        let history = vec![
            assistant("X"),
            assistant("X"),
            assistant("X"),
            user("hi"),
        ];
        let result = collapse(&history, 1);
        assert_eq!(result, vec![assistant("X"), user("hi")]);
    }

    #[test]
    fn identical_user_turns_survive() {
        let history = vec![user("same"), user("same"), assistant("a")];
        let result = collapse(&history, 1);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn non_adjacent_assistant_repeats_survive() {
        let history = vec![assistant("X"), user("hi"), assistant("X")];
        let result = collapse(&history, 1);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn trailing_cap_keeps_earliest_copies() {
        // Drive step 2 directly with a run the immediate pass would have
        // removed, mimicking a pre-sanitation stored history.
        let mut history = vec![user("q"), assistant("Y"), assistant("Y"), assistant("Y")];
        cap_trailing_run(&mut history, 2);
        assert_eq!(history, vec![user("q"), assistant("Y"), assistant("Y")]);
    }

    #[test]
    fn trailing_cap_ignores_short_histories() {
        let mut history = vec![assistant("Y")];
        cap_trailing_run(&mut history, 1);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn trailing_cap_ignores_user_tail() {
        let mut history = vec![assistant("Y"), assistant("Y"), user("hi")];
        cap_trailing_run(&mut history, 1);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn idempotent() {
        let history = vec![
            user("a"),
            assistant("X"),
            assistant("X"),
            user("b"),
            assistant("Z"),
        ];
        let once = collapse(&history, 1);
        let twice = collapse(&once, 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn no_adjacent_assistant_duplicates_after_pass() {
        let history = vec![
            assistant("A"),
            assistant("A"),
            user("u"),
            assistant("B"),
            assistant("B"),
            assistant("B"),
        ];
        let result = collapse(&history, 1);
        for pair in result.windows(2) {
            assert!(
                !(pair[0].role == Role::Assistant
                    && pair[1].role == Role::Assistant
                    && pair[0].content == pair[1].content)
            );
        }
    }

    #[test]
    fn append_guard_skips_identical_tail() {
        let history = vec![user("hi"), assistant("reply")];
        let appended = append_reply(history.clone(), "reply".to_string());
        assert_eq!(appended.len(), 2);

        let appended = append_reply(history, "different".to_string());
        assert_eq!(appended.len(), 3);
    }

    #[test]
    fn append_guard_never_grows_by_more_than_one() {
        let history = vec![user("hi")];
        let once = append_reply(history, "reply".to_string());
        let twice = append_reply(once.clone(), "reply".to_string());
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn config_rejects_zero() {
        assert!(matches!(
            SanitizerConfig::new(0, QuestionPolicy::default()),
            Err(SanitizeError::InvalidConfig(0))
        ));
        assert!(SanitizerConfig::new(1, QuestionPolicy::default()).is_ok());
    }
}
