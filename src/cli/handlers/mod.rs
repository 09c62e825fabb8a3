//! Subcommand handlers.
//!
//! Each handler is generic over [`ModelService`](ollama::api::ModelService)
//! and the writer it prints to, so the same code drives the HTTP client in
//! the binary and the scripted service in tests.

mod create;
mod generate;
mod list;
mod transfer;

pub use create::create_model;
pub use generate::run_model;
pub use list::list_models;
pub use transfer::{pull_model, push_model};
