//! Captured result of running a wrapped binary.

use std::borrow::Cow;
use std::process::ExitStatus;

/// Exit status and fully captured output streams of one run.
///
/// Each run produces a fresh value; nothing is appended across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Stdout decoded as UTF-8, replacing invalid sequences.
    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Stderr decoded as UTF-8, replacing invalid sequences.
    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}
