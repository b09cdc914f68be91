use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{AppError, AppResult};

pub(crate) type LiveRegistry = Arc<Mutex<HashSet<PathBuf>>>;

/// A panic while holding the lock leaves the set itself intact.
pub(crate) fn lock_live(live: &LiveRegistry) -> MutexGuard<'_, HashSet<PathBuf>> {
    live.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One document's render cache. Exclusively owned; removed recursively by
/// `release`, or best-effort on drop.
#[derive(Debug)]
pub struct CacheDir {
    path: PathBuf,
    name: String,
    live: LiveRegistry,
    detached: bool,
}

impl CacheDir {
    pub(crate) fn register(path: PathBuf, name: String, live: LiveRegistry) -> Self {
        lock_live(&live).insert(path.clone());
        Self {
            path,
            name,
            live,
            detached: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name relative to the cache root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn release(mut self) -> AppResult<()> {
        self.detach();
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                tracing::debug!(dir = %self.path.display(), "released cache directory");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::storage(
                err,
                format!("failed to remove cache directory {}", self.path.display()),
            )),
        }
    }

    /// Stops owning the directory without deleting it.
    pub fn keep(mut self) -> PathBuf {
        self.detach();
        std::mem::take(&mut self.path)
    }

    fn detach(&mut self) {
        self.detached = true;
        lock_live(&self.live).remove(&self.path);
    }
}

impl Drop for CacheDir {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        self.detach();
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(
                dir = %self.path.display(),
                error = %err,
                "failed to remove cache directory on drop"
            ),
        }
    }
}
