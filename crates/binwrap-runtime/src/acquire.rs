//! Acquisition: make sure the wrapped binary is present on disk.
//!
//! The pipeline is check → select → download → extract → strip. It stops at
//! the first failure and leaves any partial results (a downloaded archive, a
//! half-stripped tree) where they are; the next run starts from the check
//! again.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use binwrap_core::{
    ArchiveExtractor, ArchiveFormat, BinWrapError, BinWrapResult, CURRENT_DIR, Downloader,
    Extraction, Platform, ResolvedTarget, WrapperConfig,
};

use crate::lock::DestinationLock;
use crate::strip::strip_levels;

/// How the binary came to be available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Downloads are disabled; the path is assumed to exist.
    Unmanaged,
    /// The binary was already on disk.
    Found,
    /// The matched source has no URL, so nothing was downloaded.
    NoUrl,
    /// The binary was downloaded (and unpacked if it was an archive).
    Downloaded {
        file: PathBuf,
        archive: Option<ArchiveFormat>,
        stripped_levels: usize,
    },
}

/// Result of [`Acquirer::acquire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    /// Path the executor should run.
    pub path: PathBuf,
    pub outcome: AcquireOutcome,
}

/// Runs the acquisition pipeline using pluggable transport and archive engines.
#[derive(Clone)]
pub struct Acquirer {
    downloader: Arc<dyn Downloader>,
    extractor: Arc<dyn ArchiveExtractor>,
    platform: Platform,
    lock_destination: bool,
}

impl Acquirer {
    pub fn new(downloader: Arc<dyn Downloader>, extractor: Arc<dyn ArchiveExtractor>) -> Self {
        Self {
            downloader,
            extractor,
            platform: Platform::current(),
            lock_destination: false,
        }
    }

    /// Select sources for `platform` instead of the running host.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Hold a [`DestinationLock`] for the whole acquisition.
    #[must_use]
    pub const fn with_destination_lock(mut self, enabled: bool) -> Self {
        self.lock_destination = enabled;
        self
    }

    pub const fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Ensure the binary described by `config` is present and return its path.
    pub async fn acquire(&self, config: &WrapperConfig) -> BinWrapResult<Acquisition> {
        let target = ResolvedTarget::resolve(config, &self.platform);
        let path = target.path();

        if !config.downloads_enabled() {
            debug!(path = %path.display(), "Downloads disabled, using configured path");
            return Ok(Acquisition {
                path,
                outcome: AcquireOutcome::Unmanaged,
            });
        }

        let dest = target
            .destination()
            .unwrap_or_else(|| Path::new(CURRENT_DIR))
            .to_path_buf();

        let _lock = if self.lock_destination {
            Some(DestinationLock::acquire(&dest).await)
        } else {
            None
        };

        if exists(&path).await? {
            debug!(path = %path.display(), "Binary already present");
            return Ok(Acquisition {
                path,
                outcome: AcquireOutcome::Found,
            });
        }

        if target.source().is_none() {
            return Err(BinWrapError::NoMatchingSource {
                os: self.platform.os.clone(),
                arch: self.platform.arch.clone(),
            });
        }

        let Some(url) = target.download_url() else {
            debug!(path = %path.display(), "Matched source has no URL, skipping download");
            return Ok(Acquisition {
                path,
                outcome: AcquireOutcome::NoUrl,
            });
        };

        info!(path = %path.display(), url, "Binary not found, downloading");
        let file = self.downloader.download(url, &dest).await?;

        info!(file = %file.display(), "Downloaded, trying to extract");
        let (archive, stripped_levels) = self
            .unpack(file.clone(), dest, config.strip_levels())
            .await?;

        Ok(Acquisition {
            path,
            outcome: AcquireOutcome::Downloaded {
                file,
                archive,
                stripped_levels,
            },
        })
    }

    /// Extract and strip on the blocking pool. Stripping only applies to
    /// archives; a raw binary is left as downloaded.
    async fn unpack(
        &self,
        file: PathBuf,
        dest: PathBuf,
        strip: usize,
    ) -> BinWrapResult<(Option<ArchiveFormat>, usize)> {
        let extractor = Arc::clone(&self.extractor);
        let dest_dir = dest.clone();
        let join = tokio::task::spawn_blocking(move || -> BinWrapResult<(Option<ArchiveFormat>, usize)> {
            match extractor.extract(&file, &dest)? {
                Extraction::NotAnArchive => Ok((None, 0)),
                Extraction::Unpacked(format) if strip == 0 => Ok((Some(format), 0)),
                Extraction::Unpacked(format) => {
                    let levels = strip_levels(&dest, strip)?;
                    Ok((Some(format), levels))
                }
            }
        })
        .await;

        join.unwrap_or_else(|e| {
            Err(BinWrapError::filesystem(
                "unpack into",
                dest_dir,
                io::Error::other(e),
            ))
        })
    }
}

/// `Ok(false)` only for "not found"; other stat failures are errors.
async fn exists(path: &Path) -> BinWrapResult<bool> {
    match tokio::fs::metadata(path).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BinWrapError::filesystem("stat", path, e)),
    }
}
