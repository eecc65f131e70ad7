#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Static construction glossary: load-once keyword store, in-domain
//! relevance filtering, and first-match knowledge lookup.

/// Glossary loading and storage.
#[path = "../store.rs"]
pub mod store;

/// In-domain relevance predicate.
#[path = "../relevance.rs"]
pub mod relevance;

/// Keyword-to-answer lookup.
#[path = "../lookup.rs"]
pub mod lookup;

pub use store::{GlossaryError, GlossaryStore};
