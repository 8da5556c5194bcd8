//! Port definitions for the collaborators of the acquisition pipeline.
//!
//! The runtime crate provides the production adapters (HTTP transport,
//! built-in archive engine); tests and embedders may substitute their own.

mod download;
mod extract;
mod progress;

pub use download::Downloader;
pub use extract::{ArchiveExtractor, ArchiveFormat, Extraction};
pub use progress::{NoopProgress, ProgressReporter};
