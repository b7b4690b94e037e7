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

//! In-memory session storage.
//!
//! One transcript slot per session id, replaced wholesale on every write.
//! Sessions live for the lifetime of the process; durable persistence is a
//! concern of the excluded collaborators, not of this store.

mod store;

pub use store::SessionStore;
