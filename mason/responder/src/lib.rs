#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Language model responder: a thin, failure-hardened wrapper around a
//! pretrained generative backend.

/// Backend trait, request shape, and the offline loopback backend.
#[path = "../backend.rs"]
pub mod backend;

/// HTTP backend speaking the JSON `/generate` protocol.
#[path = "../http.rs"]
pub mod http;

/// Failure-absorbing responder facade.
#[path = "../responder.rs"]
pub mod responder;

pub use backend::{GenerateRequest, LoopbackModelBackend, ModelBackend, ModelError};
pub use http::HttpModelBackend;
pub use responder::{ModelReply, ModelResponder, APOLOGY};
