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

//! Text-generation providers.
//!
//! Two hosted backends, both thin reqwest clients behind the
//! [`medichat_core::LLMProvider`] seam: Gemini (flattened-prompt API) and
//! Groq (OpenAI-style chat completions). Transient failures retry with
//! backoff; permission failures do not.

mod gemini;
mod groq;
mod retry;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use retry::retry_with_backoff;

use medichat_core::ProviderError;

/// Map a reqwest transport error onto the provider error kinds.
pub(crate) fn map_transport(err: &reqwest::Error) -> ProviderError {
    if err.is_connect() || err.is_timeout() {
        ProviderError::Connection(err.to_string())
    } else {
        ProviderError::Request(err.to_string())
    }
}

/// Map an HTTP status onto the provider error kinds.
pub(crate) fn map_status(status: reqwest::StatusCode, body: String) -> ProviderError {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        ProviderError::Permission(format!("{status}: {body}"))
    } else {
        ProviderError::Request(format!("{status}: {body}"))
    }
}
