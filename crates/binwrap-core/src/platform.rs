//! Platform identification and source selection.
//!
//! Sources are matched against the identifiers the Rust standard library
//! reports for the running host (`std::env::consts::OS` and `ARCH`). Matching
//! is exact string equality; no aliasing (`"darwin"` is not `"macos"`).

use std::fmt;

use crate::source::{Source, is_unset};

/// OS/architecture pair used to pick a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this process is running on.
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Whether `source` applies to this platform.
    pub fn matches(&self, source: &Source) -> bool {
        field_matches(source.os.as_deref(), &self.os)
            && field_matches(source.arch.as_deref(), &self.arch)
    }

    /// Pick the first source that applies to this platform.
    ///
    /// Order is the tie-break: a universal source listed before a more
    /// specific one still wins.
    pub fn select<'a>(&self, sources: &'a [Source]) -> Option<&'a Source> {
        sources.iter().find(|src| self.matches(src))
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn field_matches(wanted: Option<&str>, actual: &str) -> bool {
    is_unset(wanted) || wanted == Some(actual)
}
