//! Archive extraction port.

use std::fmt;
use std::path::Path;

use crate::error::BinWrapResult;

/// Archive formats the built-in engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
}

impl ArchiveFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarBz2 => "tar.bz2",
            Self::TarXz => "tar.xz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an extractor did with a downloaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The file was an archive; its entries were written to the destination
    /// and the archive itself was removed.
    Unpacked(ArchiveFormat),
    /// Not a recognized archive. The file was left in place as the binary.
    NotAnArchive,
}

/// Detects and unpacks archives.
///
/// Called from a blocking context; implementations may do synchronous I/O.
pub trait ArchiveExtractor: Send + Sync {
    /// Unpack `file` into `dest_dir` if it is an archive.
    ///
    /// "Not an archive" is a successful outcome. A corrupt archive or a write
    /// failure is an error, and the downloaded file is then left in place.
    fn extract(&self, file: &Path, dest_dir: &Path) -> BinWrapResult<Extraction>;
}
