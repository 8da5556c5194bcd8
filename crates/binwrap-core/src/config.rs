//! Wrapper configuration and its builder.
//!
//! [`WrapperConfig`] is immutable once built. All mutation happens on a
//! [`WrapperConfigBuilder`], which can be recovered from an existing config
//! with [`WrapperConfig::to_builder`] to derive a modified copy.
//!
//! # Example
//!
//! ```
//! use binwrap_core::{Source, WrapperConfig};
//!
//! let config = WrapperConfig::builder()
//!     .source(Source::from_url("https://example.com/tool-linux.tar.gz").for_os("linux"))
//!     .source(Source::from_url("https://example.com/tool-macos.zip").for_os("macos"))
//!     .destination("vendor/tool")
//!     .exec_name("tool")
//!     .strip(1)
//!     .arg("--format", ["json"])
//!     .build();
//!
//! assert_eq!(config.args(), ["--format", "json"]);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::source::Source;

/// Marker destination for the current directory when a download occurs and
/// no destination was set.
pub const CURRENT_DIR: &str = ".";

/// Everything needed to acquire and run one wrapped binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperConfig {
    #[serde(default)]
    sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    destination: Option<PathBuf>,
    #[serde(default)]
    exec_name: String,
    #[serde(default)]
    strip_levels: usize,
    #[serde(default)]
    args: Vec<String>,
}

impl WrapperConfig {
    pub fn builder() -> WrapperConfigBuilder {
        WrapperConfigBuilder::default()
    }

    /// Start a builder pre-filled with this configuration.
    pub fn to_builder(&self) -> WrapperConfigBuilder {
        WrapperConfigBuilder {
            config: self.clone(),
        }
    }

    /// Configured sources, in priority order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Destination as configured, without defaulting.
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Destination the binary lives in.
    ///
    /// When downloads are enabled and no destination was set this is the
    /// current directory (`"."`). When downloads are disabled and no
    /// destination was set there is none, and the executable name is used as
    /// given (the OS looks it up on `PATH`).
    pub fn effective_destination(&self) -> Option<&Path> {
        match &self.destination {
            Some(dest) => Some(dest),
            None if self.downloads_enabled() => Some(Path::new(CURRENT_DIR)),
            None => None,
        }
    }

    pub fn exec_name(&self) -> &str {
        &self.exec_name
    }

    pub const fn strip_levels(&self) -> usize {
        self.strip_levels
    }

    /// Arguments passed before any call-time arguments on every run.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// False once sources were cleared with [`WrapperConfigBuilder::skip_download`].
    pub fn downloads_enabled(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// Mutable builder for [`WrapperConfig`].
///
/// Setters take and return the builder so calls chain. No setter validates
/// its input.
#[derive(Debug, Clone, Default)]
pub struct WrapperConfigBuilder {
    config: WrapperConfig,
}

impl WrapperConfigBuilder {
    /// Add a source. Earlier sources take priority.
    #[must_use]
    pub fn source(mut self, source: Source) -> Self {
        self.config.sources.push(source);
        self
    }

    /// Directory the files are downloaded and extracted into.
    #[must_use]
    pub fn destination(mut self, dest: impl Into<PathBuf>) -> Self {
        self.config.destination = Some(dest.into());
        self
    }

    /// File inside the destination to use as the binary. A selected source's
    /// `exec_path` takes precedence.
    #[must_use]
    pub fn exec_name(mut self, name: impl Into<String>) -> Self {
        self.config.exec_name = name.into();
        self
    }

    /// Drop all sources, so runs use the configured path without downloading.
    #[must_use]
    pub fn skip_download(mut self) -> Self {
        self.config.sources.clear();
        self
    }

    /// Number of leading directory levels to flatten after extraction.
    #[must_use]
    pub const fn strip(mut self, levels: usize) -> Self {
        self.config.strip_levels = levels;
        self
    }

    /// Append a flag followed by its values to the persistent arguments.
    #[must_use]
    pub fn arg<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.args.push(name.into());
        self.config.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// Append a single argument with no values.
    #[must_use]
    pub fn flag(self, name: impl Into<String>) -> Self {
        self.arg(name, std::iter::empty::<String>())
    }

    /// Remove all persistent arguments.
    #[must_use]
    pub fn reset_args(mut self) -> Self {
        self.config.args.clear();
        self
    }

    pub fn build(self) -> WrapperConfig {
        self.config
    }
}
