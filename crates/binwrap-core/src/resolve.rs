//! Executable path resolution.
//!
//! Resolution happens in two explicit steps: [`ResolvedTarget::resolve`]
//! selects the source for a platform and settles the executable name once,
//! then [`ResolvedTarget::path`] joins it with the destination. Neither step
//! mutates the configuration.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tracing::debug;

use crate::config::{CURRENT_DIR, WrapperConfig};
use crate::platform::Platform;
use crate::source::Source;

/// Source, executable name and destination settled for one platform.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTarget<'a> {
    source: Option<&'a Source>,
    exec_name: &'a str,
    destination: Option<&'a Path>,
}

impl<'a> ResolvedTarget<'a> {
    /// Select the matching source and settle the executable name.
    ///
    /// A selected source's `exec_path` overrides the configured name.
    pub fn resolve(config: &'a WrapperConfig, platform: &Platform) -> Self {
        let source = platform.select(config.sources());
        let exec_name = source
            .and_then(Source::exec_override)
            .unwrap_or_else(|| config.exec_name());

        debug!(
            platform = %platform,
            matched = source.is_some(),
            exec_name,
            "Resolved wrapped binary"
        );

        Self {
            source,
            exec_name,
            destination: config.effective_destination(),
        }
    }

    /// The matched source, if any.
    pub const fn source(&self) -> Option<&'a Source> {
        self.source
    }

    /// URL to download from, if a source matched and it carries one.
    pub fn download_url(&self) -> Option<&'a str> {
        self.source.and_then(Source::url_str)
    }

    pub const fn exec_name(&self) -> &'a str {
        self.exec_name
    }

    pub const fn destination(&self) -> Option<&'a Path> {
        self.destination
    }

    /// Full path of the executable.
    pub fn path(&self) -> PathBuf {
        resolve_path(self.destination, self.exec_name)
    }
}

/// Join a destination and an executable name.
///
/// The current-directory marker `"."` is joined with a literal separator so
/// the result is exactly `./name`. Without a destination the name is returned
/// as-is.
pub fn resolve_path(destination: Option<&Path>, exec_name: &str) -> PathBuf {
    match destination {
        None => PathBuf::from(exec_name),
        Some(dest) if dest.as_os_str() == CURRENT_DIR => {
            PathBuf::from(format!("{CURRENT_DIR}{MAIN_SEPARATOR}{exec_name}"))
        }
        Some(dest) => dest.join(exec_name),
    }
}
