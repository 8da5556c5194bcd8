//! Core domain types and ports for binwrap.
//!
//! binwrap treats an external command-line executable as a managed local
//! dependency. This crate holds the pure parts: source descriptors, platform
//! selection, configuration, path resolution, the error taxonomy, and the
//! traits the runtime adapters implement. See `binwrap-runtime` for
//! downloading, extraction and execution.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod output;
pub mod platform;
pub mod ports;
pub mod resolve;
pub mod source;

pub use config::{CURRENT_DIR, WrapperConfig, WrapperConfigBuilder};
pub use error::{BinWrapError, BinWrapResult, ErrorKind};
pub use output::RunOutput;
pub use platform::Platform;
pub use ports::{
    ArchiveExtractor, ArchiveFormat, Downloader, Extraction, NoopProgress, ProgressReporter,
};
pub use resolve::{ResolvedTarget, resolve_path};
pub use source::Source;
