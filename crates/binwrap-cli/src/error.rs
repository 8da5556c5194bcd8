//! CLI-specific error types and mappings.
//!
//! Maps [`BinWrapError`] categories to exit codes and user-facing messages.

use binwrap_core::{BinWrapError, ErrorKind};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// No source fits the selected platform.
    #[error("{0}")]
    Unsupported(String),

    /// Download or redirect failure.
    #[error("Download error: {0}")]
    Download(String),

    /// Filesystem error (directory creation, write, rename, removal).
    #[error("IO error: {0}")]
    Io(String),

    /// The downloaded archive could not be unpacked.
    #[error("Archive error: {0}")]
    Archive(String),

    /// The wrapped binary could not be started or exited unsuccessfully.
    #[error("Process error: {0}")]
    Process(String),

    /// Anything not raised by the binwrap library.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h:
    /// - 1: General error
    /// - 65: EX_DATAERR (unusable archive)
    /// - 69: EX_UNAVAILABLE (no binary for this platform, or download failed)
    /// - 71: EX_OSERR (process could not be started)
    /// - 74: EX_IOERR
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Unsupported(_) | Self::Download(_) => 69,
            Self::Io(_) => 74,
            Self::Archive(_) => 65,
            Self::Process(_) => 71,
            Self::Other(_) => 1,
        }
    }
}

impl From<BinWrapError> for CliError {
    fn from(err: BinWrapError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NoMatchingSource => Self::Unsupported(message),
            ErrorKind::Transport => Self::Download(message),
            ErrorKind::Filesystem => Self::Io(message),
            ErrorKind::Extraction => Self::Archive(message),
            ErrorKind::ProcessStart | ErrorKind::ProcessExit => Self::Process(message),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<BinWrapError>() {
            Ok(err) => err.into(),
            Err(err) => Self::Other(format!("{err:#}")),
        }
    }
}
