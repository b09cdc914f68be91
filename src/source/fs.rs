use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{AppError, AppResult};

use super::location::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Directory,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceStat {
    pub kind: ResourceKind,
    pub size: u64,
}

impl ResourceStat {
    pub fn file(size: u64) -> Self {
        Self {
            kind: ResourceKind::File,
            size,
        }
    }

    /// Only non-empty regular files are handed to the rasterizer.
    pub fn has_content(&self) -> bool {
        self.kind == ResourceKind::File && self.size > 0
    }
}

/// Host filesystem access for resources that may not live on local disk.
pub trait ResourceFs: Send + Sync {
    /// `Ok(None)` when the resource does not exist.
    fn stat(&self, location: &SourceLocation) -> AppResult<Option<ResourceStat>>;

    /// Writes the resource's bytes to `dest`, returning the byte count.
    fn copy_to_local(&self, location: &SourceLocation, dest: &Path) -> AppResult<u64>;
}

/// Serves local paths only; remote locations need a host-provided
/// implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalResourceFs;

impl ResourceFs for LocalResourceFs {
    fn stat(&self, location: &SourceLocation) -> AppResult<Option<ResourceStat>> {
        let SourceLocation::Local(path) = location else {
            return Err(unsupported_scheme(location));
        };

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(AppError::io_with_context(
                    err,
                    format!("failed to stat {}", path.display()),
                ));
            }
        };

        let kind = if metadata.is_file() {
            ResourceKind::File
        } else if metadata.is_dir() {
            ResourceKind::Directory
        } else {
            ResourceKind::Other
        };
        Ok(Some(ResourceStat {
            kind,
            size: metadata.len(),
        }))
    }

    fn copy_to_local(&self, location: &SourceLocation, dest: &Path) -> AppResult<u64> {
        let SourceLocation::Local(path) = location else {
            return Err(AppError::copy(
                location.to_string(),
                AppError::unsupported(format!("no reader for scheme '{}'", location.scheme())),
            ));
        };
        fs::copy(path, dest).map_err(|source| AppError::copy(location.to_string(), source))
    }
}

fn unsupported_scheme(location: &SourceLocation) -> AppError {
    AppError::unsupported(format!(
        "cannot access '{location}': no reader for scheme '{}'",
        location.scheme()
    ))
}
