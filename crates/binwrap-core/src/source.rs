//! Source descriptors: where a binary can be downloaded from, and for which platform.

use serde::{Deserialize, Serialize};

/// One candidate download location for the wrapped binary.
///
/// A source with neither `os` nor `arch` set is a universal fallback. Sources
/// are tried in the order they were configured and the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// URL of the file or archive to download. `None` skips the download.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// OS identifier this source applies to (`std::env::consts::OS`). `None` matches any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    /// Architecture identifier (`std::env::consts::ARCH`). `None` matches any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Executable file name inside the destination once this source is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_path: Option<String>,
}

impl Source {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source downloading from `url`.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new().with_url(url)
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Tie the source to an OS. Values are compared literally against
    /// `std::env::consts::OS` (`"linux"`, `"macos"`, `"windows"`, ...).
    #[must_use]
    pub fn for_os(mut self, os: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self
    }

    /// Tie the source to an architecture. Values are compared literally against
    /// `std::env::consts::ARCH` (`"x86_64"`, `"aarch64"`, ...).
    #[must_use]
    pub fn for_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Use a specific file inside the destination as the binary.
    #[must_use]
    pub fn with_exec_path(mut self, exec_path: impl Into<String>) -> Self {
        self.exec_path = Some(exec_path.into());
        self
    }

    /// True when the source applies to every platform.
    pub fn is_universal(&self) -> bool {
        is_unset(self.os.as_deref()) && is_unset(self.arch.as_deref())
    }

    pub(crate) fn url_str(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    pub(crate) fn exec_override(&self) -> Option<&str> {
        self.exec_path.as_deref().filter(|p| !p.is_empty())
    }
}

/// Empty strings count as "not set", same as `None`.
pub(crate) fn is_unset(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}
