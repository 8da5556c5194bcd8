//! Flattening of wrapper directories left by archives.
//!
//! Archives commonly nest everything inside one or more generated directories
//! (`tool-v1.2.3/bin/...`). Stripping N levels descends N times into the first
//! subdirectory, moves whatever it finds there up into the destination root,
//! and deletes the directories it passed through.
//!
//! When a level has no subdirectory the descent stops there without error and
//! the contents of the deepest directory reached are moved up. This matches
//! the behavior existing users rely on; whether insufficient nesting should be
//! an error instead is still undecided.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use binwrap_core::{BinWrapError, BinWrapResult};

/// Name of the temporary directory the outermost wrapper is renamed to, so
/// entries that share its name can be moved into the root.
const STAGING_PREFIX: &str = ".binwrap-strip-";

/// Strip `levels` leading directory levels inside `dest`.
///
/// Returns the number of levels actually descended. Failures part-way are not
/// rolled back.
pub fn strip_levels(dest: &Path, levels: usize) -> BinWrapResult<usize> {
    let mut current = dest.to_path_buf();
    let mut descended: Vec<PathBuf> = Vec::new();

    for level in 0..levels {
        match first_subdirectory(&current)? {
            Some(next) => {
                current = next;
                descended.push(current.clone());
            }
            None => {
                debug!(
                    dir = %current.display(),
                    level,
                    requested = levels,
                    "No subdirectory to descend into, stopping strip early"
                );
                break;
            }
        }
    }

    let Some(outer) = descended.first() else {
        return Ok(0);
    };

    // Everything descended into lives under `outer`, so moving it aside and
    // deleting it afterwards removes every wrapper level at once.
    let staging = dest.join(format!("{STAGING_PREFIX}{}", std::process::id()));
    fs::rename(outer, &staging).map_err(|e| BinWrapError::filesystem("move", outer, e))?;

    let innermost = match current.strip_prefix(outer) {
        Ok(rest) => staging.join(rest),
        Err(_) => staging.clone(),
    };

    for entry in read_dir_sorted(&innermost)? {
        let from = entry.path();
        let to = dest.join(entry.file_name());
        fs::rename(&from, &to).map_err(|e| BinWrapError::filesystem("move", &from, e))?;
    }

    fs::remove_dir_all(&staging).map_err(|e| BinWrapError::filesystem("remove", &staging, e))?;

    debug!(dest = %dest.display(), levels = descended.len(), "Stripped wrapper directories");
    Ok(descended.len())
}

/// First directory entry of `dir` by name, if any.
fn first_subdirectory(dir: &Path) -> BinWrapResult<Option<PathBuf>> {
    for entry in read_dir_sorted(dir)? {
        let file_type = entry
            .file_type()
            .map_err(|e| BinWrapError::filesystem("read", entry.path(), e))?;
        if file_type.is_dir() {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

/// Directory entries sorted by file name, so "first" is deterministic.
fn read_dir_sorted(dir: &Path) -> BinWrapResult<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| BinWrapError::filesystem("read directory", dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| BinWrapError::filesystem("read directory", dir, e))?;
    entries.sort_by_key(fs::DirEntry::file_name);
    Ok(entries)
}
