#![warn(
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

//! Conversation-history sanitation for the medical chat assistant.
//!
//! Every assistant turn that reaches the stored transcript goes through a
//! fixed pipeline:
//!
//! 1. duplicate collapse: no immediate assistant repeats, capped trailing
//!    run ([`collapse_duplicates`])
//! 2. question enforcement: the reply ends by inviting more input, with
//!    the safety disclaimer kept last ([`enforce_question`])
//! 3. append guard: an identical finalized reply is never appended twice
//!    ([`append_reply`])
//!
//! [`ConversationManager`] drives the pipeline per turn; the passes
//! themselves are pure functions over the transcript and are usable on
//! their own.

mod history;
mod manager;
mod question;
mod sanitizer;
mod session;

pub use history::{HistoryConfig, HistoryWindow};
pub use manager::{
    ConversationConfig, ConversationError, ConversationManager, SYSTEM_PROMPT, TurnPhase,
    TurnResult, TurnUsage, fallback_reply,
};
pub use question::{QuestionPolicy, contains_disclaimer, ends_with_question, enforce_question};
pub use sanitizer::{
    SanitizeError, SanitizerConfig, append_reply, cap_trailing_run, collapse_duplicates,
    collapse_immediate,
};
pub use session::ConversationSession;
