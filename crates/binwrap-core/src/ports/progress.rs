//! Progress reporting abstraction for downloads.
//!
//! Lets CLI and embedding applications observe a download without the
//! runtime depending on any particular UI.

/// Trait for receiving progress updates during a download.
pub trait ProgressReporter: Send + Sync {
    /// Called when a download starts.
    ///
    /// # Arguments
    /// * `message` - Description of what's starting (e.g., the file name)
    /// * `total` - Total size in bytes if the server announced it
    fn start(&self, message: &str, total: Option<u64>);

    /// Called after each chunk is written with the running byte count.
    fn update(&self, current: u64, total: Option<u64>);

    /// Called when the download completes successfully.
    fn finish(&self, message: &str);

    /// Called when the download fails.
    fn finish_with_error(&self, message: &str);
}

/// A no-op progress reporter that ignores all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&self, _message: &str, _total: Option<u64>) {}
    fn update(&self, _current: u64, _total: Option<u64>) {}
    fn finish(&self, _message: &str) {}
    fn finish_with_error(&self, _message: &str) {}
}
