//! Command-line front end for binwrap.
//!
//! The binary in `main.rs` only wires logging and dispatch; parsing, error
//! mapping, progress and handlers live here so they can be tested.

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary target only.
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod error;
pub mod handlers;
pub mod parser;
pub mod progress;

pub use error::CliError;
pub use parser::{Cli, Commands, WrapArgs};
pub use progress::CliProgress;
