//! API Client Layer - model-serving API over HTTP with NDJSON streaming
//!
//! This module provides:
//! - Request, response and stream event types
//! - ModelService trait for API abstraction
//! - Client implementation over reqwest
//! - MockService for scripted tests
//! - Error discrimination for bodies and stream lines
//! - Line-oriented stream decoding

pub mod client;
pub mod mock;
pub mod status;
pub mod stream;
pub mod types;

pub use client::{Client, DEFAULT_HOST, EventSink, ModelService};
pub use mock::MockService;
pub use stream::{LineCodec, decode_line, read_events};
pub use types::{
    CreateProgress, CreateRequest, GenerateRequest, GenerateResponse, ListResponse, ModelSummary, Options,
    PullRequest, PushRequest, TransferProgress,
};
