#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Conversation plumbing for the mason assistant: append-only turn
//! history, prompt assembly, and the response orchestrator that turns one
//! utterance plus history into one reply.

/// Turn and history types.
#[path = "../history.rs"]
pub mod history;

/// Prompt template and assembly.
#[path = "../prompt.rs"]
pub mod prompt;

/// The response decision pipeline.
#[path = "../orchestrator.rs"]
pub mod orchestrator;

/// Structured logging and event publication for chat exchanges.
#[path = "../telemetry.rs"]
pub mod telemetry;

pub use history::{ChatHistory, Speaker, Turn};
pub use orchestrator::{ChatOutcome, OrchestratorState, Resolution, ResponseOrchestrator, REFUSAL};
pub use prompt::{build_prompt, HISTORY_WINDOW};
pub use telemetry::{ChatTelemetry, ChatTelemetryBuilder};
