//! Download port.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::BinWrapResult;

/// Fetches a URL into a directory.
///
/// Implementations create `dest_dir` if needed, name the local file after the
/// last segment of the URL path, overwrite any existing file of that name,
/// and return the path written. Non-success responses are errors.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str, dest_dir: &Path) -> BinWrapResult<PathBuf>;
}
