use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use uuid::Uuid;

use crate::config::CacheConfig;
use crate::error::{AppError, AppResult};

use super::dir::{CacheDir, LiveRegistry, lock_live};

const DIR_PREFIX: &str = "doc-";
const MAX_ALLOCATE_ATTEMPTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReapReport {
    pub removed: usize,
    pub failed: usize,
}

/// Shared parent of every per-document cache directory.
#[derive(Debug, Clone)]
pub struct CacheRoot {
    path: PathBuf,
    live: LiveRegistry,
}

impl CacheRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            live: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.root_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ensure(&self) -> AppResult<()> {
        fs::create_dir_all(&self.path).map_err(|source| {
            AppError::storage(
                source,
                format!("failed to create cache root {}", self.path.display()),
            )
        })
    }

    /// Creates a fresh, never-before-used directory under the root.
    pub fn allocate(&self) -> AppResult<CacheDir> {
        self.ensure()?;

        let mut last_collision = None;
        for _ in 0..MAX_ALLOCATE_ATTEMPTS {
            let name = format!("{DIR_PREFIX}{}", Uuid::new_v4().simple());
            let path = self.path.join(&name);
            match fs::create_dir(&path) {
                Ok(()) => {
                    tracing::debug!(dir = %path.display(), "allocated cache directory");
                    return Ok(CacheDir::register(path, name, Arc::clone(&self.live)));
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => last_collision = Some(err),
                Err(err) => {
                    return Err(AppError::storage(
                        err,
                        format!("failed to create cache directory {}", path.display()),
                    ));
                }
            }
        }

        Err(AppError::storage(
            last_collision
                .unwrap_or_else(|| std::io::Error::from(ErrorKind::AlreadyExists)),
            format!(
                "could not find a free cache directory name under {}",
                self.path.display()
            ),
        ))
    }

    pub fn live_count(&self) -> usize {
        lock_live(&self.live).len()
    }

    /// Removes cache directories no handle in this process owns and that
    /// have not been touched for `min_age`.
    ///
    /// Liveness is only known for this process. A directory another process
    /// has held open for longer than `min_age` is removed too.
    pub fn reap_orphans(&self, min_age: Duration) -> AppResult<ReapReport> {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ReapReport::default()),
            Err(err) => {
                return Err(AppError::storage(
                    err,
                    format!("failed to list cache root {}", self.path.display()),
                ));
            }
        };

        let live: HashSet<PathBuf> = lock_live(&self.live).clone();
        let now = SystemTime::now();
        let mut report = ReapReport::default();

        for entry in entries.flatten() {
            let path = entry.path();
            let is_cache_dir = entry.file_type().is_ok_and(|kind| kind.is_dir())
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with(DIR_PREFIX));
            if !is_cache_dir || live.contains(&path) {
                continue;
            }

            let age = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or(Duration::ZERO);
            if age < min_age {
                continue;
            }

            match fs::remove_dir_all(&path) {
                Ok(()) => report.removed += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        dir = %path.display(),
                        error = %err,
                        "failed to reap orphaned cache directory"
                    );
                }
            }
        }

        if report.removed > 0 || report.failed > 0 {
            tracing::info!(
                removed = report.removed,
                failed = report.failed,
                "reaped orphaned cache directories"
            );
        }
        Ok(report)
    }
}
