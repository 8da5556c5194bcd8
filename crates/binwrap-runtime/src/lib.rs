//! Download, extraction and process runtime for binwrap.
//!
//! This crate provides the adapters behind the ports in `binwrap-core`
//! ([`HttpDownloader`], [`BuiltinExtractor`]), the acquisition pipeline, the
//! process executor, and the [`BinWrapper`] facade that ties them together.

#![deny(unused_crate_dependencies)]

pub mod acquire;
pub mod download;
pub mod exec;
pub mod extract;
pub mod lock;
pub mod strip;
mod wrapper;

pub use acquire::{AcquireOutcome, Acquirer, Acquisition};
pub use download::{DownloaderConfig, HttpDownloader};
pub use exec::{compose_args, execute};
pub use extract::{BuiltinExtractor, detect_format};
pub use lock::DestinationLock;
pub use strip::strip_levels;
pub use wrapper::BinWrapper;

// Re-export the core types most callers need alongside the runtime.
pub use binwrap_core::{
    BinWrapError, BinWrapResult, ErrorKind, Platform, RunOutput, Source, WrapperConfig,
};
