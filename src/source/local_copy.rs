use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AppError, AppResult};

use super::fs::ResourceFs;
use super::location::SourceLocation;

/// Local copy of a non-local source. The file is removed by `remove`, or on
/// drop if the owner never got that far.
#[derive(Debug)]
pub struct LocalCopy {
    path: PathBuf,
    removed: bool,
}

impl LocalCopy {
    pub async fn materialize(
        resources: Arc<dyn ResourceFs>,
        location: &SourceLocation,
        dest: PathBuf,
    ) -> AppResult<Self> {
        let task_location = location.clone();
        let task_dest = dest.clone();
        let copied = tokio::task::spawn_blocking(move || {
            resources.copy_to_local(&task_location, &task_dest)
        })
        .await
        .map_err(|join_err| AppError::copy(location.to_string(), join_err))?;

        // Partial writes still leave a file behind.
        let copy = Self {
            path: dest,
            removed: false,
        };
        let bytes = copied?;
        tracing::debug!(
            source = %location,
            dest = %copy.path.display(),
            bytes,
            "materialized non-local source"
        );
        Ok(copy)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn remove(mut self) -> AppResult<()> {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::storage(
                err,
                format!("failed to remove local copy {}", self.path.display()),
            )),
        }
    }
}

impl Drop for LocalCopy {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(err) = std::fs::remove_file(&self.path)
            && err.kind() != ErrorKind::NotFound
        {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove local copy"
            );
        }
    }
}
