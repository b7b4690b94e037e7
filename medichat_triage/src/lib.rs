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

//! Triage report generation on top of the chat transcript.
//!
//! Turns the assistant's latest reply into a structured clinical triage
//! report: prompt builders for the summary and detailed variants, a
//! plain-text section parser for the model's output, and the word-count
//! gate deciding when a conversation carries enough detail to triage.

mod readiness;
mod report;
mod sections;

pub use readiness::{DEFAULT_MIN_WORDS, is_ready, user_word_count};
pub use report::{Patient, TriageError, TriageReporter, detailed_prompt, summary_prompt};
pub use sections::{ReportLine, ReportSection, parse_sections};
