//! Error types for binary acquisition and execution.
//!
//! Every stage of the pipeline reports failures through [`BinWrapError`].
//! Nothing is retried or rolled back: the first error ends the run and is
//! handed back to the caller as-is.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::output::RunOutput;

/// Errors that can occur while acquiring or running a wrapped binary.
#[derive(Debug, Error)]
pub enum BinWrapError {
    // === Selection ===
    /// No configured source fits the running OS/architecture.
    #[error("No binary found matching your system ({os}/{arch}). It's probably not supported.")]
    NoMatchingSource { os: String, arch: String },

    // === Download ===
    /// Malformed URL, connection failure, or non-success HTTP response.
    #[error("Download of {url} failed: {reason}")]
    Transport { url: String, reason: String },

    // === Filesystem ===
    /// Directory creation, file write, rename, or removal failed.
    #[error("Failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Archive unpack failed.
    #[error("Failed to extract {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    // === Process ===
    /// The executable could not be started (missing, not executable).
    #[error("Failed to start {}: {source}", path.display())]
    ProcessStart {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The process ran but exited unsuccessfully. The captured output is kept.
    #[error("{} exited with {}", path.display(), output.status)]
    ProcessExit { path: PathBuf, output: RunOutput },
}

/// Category of a [`BinWrapError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoMatchingSource,
    Transport,
    Filesystem,
    Extraction,
    ProcessStart,
    ProcessExit,
}

impl BinWrapError {
    /// Create a `Transport` error for a URL.
    pub fn transport(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a `Filesystem` error. `action` reads as a verb phrase, e.g. "create directory".
    pub fn filesystem(action: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an `Extraction` error for an archive.
    pub fn extraction(path: impl AsRef<Path>, reason: impl std::fmt::Display) -> Self {
        Self::Extraction {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoMatchingSource { .. } => ErrorKind::NoMatchingSource,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::ProcessStart { .. } => ErrorKind::ProcessStart,
            Self::ProcessExit { .. } => ErrorKind::ProcessExit,
        }
    }

    /// Output captured before the failure, if the process got that far.
    pub const fn output(&self) -> Option<&RunOutput> {
        match self {
            Self::ProcessExit { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Result type alias for binwrap operations
pub type BinWrapResult<T> = Result<T, BinWrapError>;
