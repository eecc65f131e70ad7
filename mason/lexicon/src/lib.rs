#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Spell correction against a domain vocabulary.
//!
//! Correction is an enhancement, never a requirement: callers are expected
//! to fall back to the uncorrected text when a corrector reports an error.

/// Frequency-weighted domain vocabulary.
#[path = "../vocabulary.rs"]
pub mod vocabulary;

/// Token-level spell corrector.
#[path = "../corrector.rs"]
pub mod corrector;

pub use corrector::{CorrectionError, LexiconCorrector, SpellCorrector};
pub use vocabulary::Vocabulary;
