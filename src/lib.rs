//! Ollama - client library for a local model-serving service
//!
//! Talks to the server over JSON requests whose responses are either a single
//! document or a newline-delimited stream of events, and provides the state
//! machines used to present those streams: per-layer transfer progress and
//! conversational context threaded across generation turns.

pub mod api;
pub mod error;
pub mod progress;
pub mod session;

pub use error::{ClientError, ErrorResponse, Result};
