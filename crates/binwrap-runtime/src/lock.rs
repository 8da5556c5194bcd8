//! Opt-in per-destination locking for acquisitions.
//!
//! Acquisition is not safe to run concurrently against one destination
//! directory: two callers may both download, or one may strip while the other
//! extracts. Callers that do acquire concurrently take a [`DestinationLock`]
//! for the duration. The lock is process-wide and keyed by the absolute
//! destination path; it does not coordinate separate processes. A registry
//! entry lives only while some caller holds or waits for that destination.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

static DESTINATION_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Scoped lock on one destination directory. Released on drop.
#[derive(Debug)]
pub struct DestinationLock {
    path: PathBuf,
    guard: Option<OwnedMutexGuard<()>>,
}

impl DestinationLock {
    /// Wait until no other holder has `dest` locked, then lock it.
    pub async fn acquire(dest: &Path) -> Self {
        let path = lock_key(dest);
        let mutex = {
            let mut locks = DESTINATION_LOCKS
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(path.clone()).or_default())
        };

        debug!(dest = %path.display(), "Waiting for destination lock");
        let guard = mutex.lock_owned().await;
        debug!(dest = %path.display(), "Destination lock acquired");

        Self {
            path,
            guard: Some(guard),
        }
    }

    /// The normalized path this lock is held on.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DestinationLock {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Clones of the mutex are only made under the registry lock, so a
        // count of one here means nobody else holds or awaits it.
        let mut locks = DESTINATION_LOCKS
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.path)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            locks.remove(&self.path);
        }
    }
}

/// Absolute form of `dest` without touching the filesystem, so a destination
/// that does not exist yet still gets a stable key.
fn lock_key(dest: &Path) -> PathBuf {
    std::path::absolute(dest).unwrap_or_else(|_| dest.to_path_buf())
}
