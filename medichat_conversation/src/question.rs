//! Follow-up question enforcement for generated replies.
//!
//! The assistant's house style is to end every reply with a short clarifying
//! question inviting more detail. Models drift from that instruction, so the
//! transform here guarantees it after the fact, taking care not to duplicate
//! or displace the mandatory safety disclaimer line.

use crate::sanitizer::SanitizeError;

/// Phrases that count as an invitation for more input even without a `?`.
const FOLLOW_UP_PHRASES: [&str; 5] = [
    "tell me more",
    "can you tell",
    "could you tell",
    "please describe",
    "please tell",
];

const DEFAULT_DISCLAIMER_MARKER: &str = "this is general information";

const DEFAULT_FALLBACK_QUESTION: &str = "Could you tell me a bit more about your symptoms \
     (when they started, severity, and any other symptoms)?";

/// How to recognize the disclaimer line and what question to inject.
#[derive(Debug, Clone)]
pub struct QuestionPolicy {
    /// Case-insensitive substring identifying the mandatory safety line.
    pub disclaimer_marker: String,
    /// Clarifying question appended when the reply doesn't ask one.
    pub fallback_question: String,
}

impl Default for QuestionPolicy {
    fn default() -> Self {
        Self {
            disclaimer_marker: DEFAULT_DISCLAIMER_MARKER.to_string(),
            fallback_question: DEFAULT_FALLBACK_QUESTION.to_string(),
        }
    }
}

/// Whether a reply already invites further input.
///
/// Heuristic, not a grammar check: the trimmed text ends with `?`, or the
/// lower-cased text contains one of the known invitation phrases.
#[must_use]
pub fn ends_with_question(text: &str) -> bool {
    if text.trim().ends_with('?') {
        return true;
    }
    let lowered = text.to_lowercase();
    FOLLOW_UP_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Case-insensitive check for the mandatory disclaimer line.
#[must_use]
pub fn contains_disclaimer(text: &str, marker: &str) -> bool {
    text.to_lowercase().contains(&marker.to_lowercase())
}

/// Guarantee the candidate reply ends by inviting further input.
///
/// Replies that already ask a question pass through unchanged. Otherwise
/// the fallback question is appended: before the disclaimer when the
/// disclaimer sits alone on the final line, after everything when it is
/// embedded inline or absent. Pure and deterministic; the only failure is
/// an empty (whitespace-only) candidate.
pub fn enforce_question(
    candidate: &str,
    policy: &QuestionPolicy,
) -> Result<String, SanitizeError> {
    if candidate.trim().is_empty() {
        return Err(SanitizeError::EmptyReply);
    }
    if ends_with_question(candidate) {
        return Ok(candidate.to_string());
    }

    if contains_disclaimer(candidate, &policy.disclaimer_marker) {
        if let Some(split_at) = candidate.rfind('\n') {
            let body = &candidate[..split_at];
            let last_line = &candidate[split_at + 1..];
            if contains_disclaimer(last_line, &policy.disclaimer_marker) {
                return Ok(format!(
                    "{}\n\n{}\n\n{}",
                    body.trim_end(),
                    policy.fallback_question,
                    last_line
                ));
            }
        }
        // Marker present but not isolated on the last line: leave the
        // disclaimer embedded and append the question after everything.
        return Ok(format!(
            "{}\n\n{}",
            candidate.trim_end(),
            policy.fallback_question
        ));
    }

    Ok(format!(
        "{}\n\n{}",
        candidate.trim_end(),
        policy.fallback_question
    ))
}
