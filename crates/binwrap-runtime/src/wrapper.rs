//! `BinWrapper`: acquire-then-run facade over a [`WrapperConfig`].
//!
//! # Example
//!
//! ```rust,no_run
//! use binwrap_core::{Source, WrapperConfig};
//! use binwrap_runtime::BinWrapper;
//!
//! # async fn demo() -> binwrap_core::BinWrapResult<()> {
//! let config = WrapperConfig::builder()
//!     .source(
//!         Source::from_url("https://example.com/tool-x86_64-linux.tar.gz")
//!             .for_os("linux")
//!             .for_arch("x86_64"),
//!     )
//!     .destination("vendor/tool")
//!     .exec_name("tool")
//!     .strip(1)
//!     .build();
//!
//! let output = BinWrapper::new(config).run(["--version"]).await?;
//! println!("{}", output.stdout_lossy());
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! One `BinWrapper` may be shared and run concurrently; each run returns its
//! own output. Acquisitions into the same destination are only serialized
//! when [`BinWrapper::with_destination_lock`] is enabled.

use std::path::PathBuf;
use std::sync::Arc;

use binwrap_core::{
    ArchiveExtractor, BinWrapResult, Downloader, Platform, ResolvedTarget, RunOutput,
    WrapperConfig,
};

use crate::acquire::{Acquirer, Acquisition};
use crate::download::HttpDownloader;
use crate::exec::{compose_args, execute};
use crate::extract::BuiltinExtractor;

/// A wrapped command-line binary.
#[derive(Clone)]
pub struct BinWrapper {
    config: WrapperConfig,
    acquirer: Acquirer,
}

impl BinWrapper {
    /// Wrap `config` using the HTTP downloader and built-in archive engine.
    pub fn new(config: WrapperConfig) -> Self {
        Self::with_adapters(
            config,
            Arc::new(HttpDownloader::default()),
            Arc::new(BuiltinExtractor),
        )
    }

    /// Wrap `config` with custom transport and archive adapters.
    pub fn with_adapters(
        config: WrapperConfig,
        downloader: Arc<dyn Downloader>,
        extractor: Arc<dyn ArchiveExtractor>,
    ) -> Self {
        Self {
            config,
            acquirer: Acquirer::new(downloader, extractor),
        }
    }

    /// Select sources for `platform` instead of the running host.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.acquirer = self.acquirer.with_platform(platform);
        self
    }

    /// Serialize acquisitions that target the same destination directory.
    #[must_use]
    pub fn with_destination_lock(mut self, enabled: bool) -> Self {
        self.acquirer = self.acquirer.with_destination_lock(enabled);
        self
    }

    pub const fn config(&self) -> &WrapperConfig {
        &self.config
    }

    /// Path of the executable for the selected platform. Pure: does not
    /// touch the filesystem or the configuration.
    pub fn path(&self) -> PathBuf {
        ResolvedTarget::resolve(&self.config, self.acquirer.platform()).path()
    }

    /// Make sure the binary is present, downloading it if needed.
    pub async fn ensure_installed(&self) -> BinWrapResult<Acquisition> {
        self.acquirer.acquire(&self.config).await
    }

    /// Acquire the binary if needed, then run it with the configured
    /// arguments followed by `args`.
    pub async fn run<I, S>(&self, args: I) -> BinWrapResult<RunOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args = {
            let extra: Vec<S> = args.into_iter().collect();
            compose_args(self.config.args(), &extra)
        };
        let acquisition = self.ensure_installed().await?;
        execute(&acquisition.path, &args).await
    }
}
