//! CLI module for ollama - command-line interface and subcommands.
//!
//! Provides the clap definitions and the handlers that drive the API client
//! for each subcommand.

pub mod commands;
pub mod handlers;

pub use commands::Cli;
