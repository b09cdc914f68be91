use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use futures_util::future::BoxFuture;

use crate::backend::{Rasterizer, RenderRequest};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::source::{LocalResourceFs, ResourceFs, ResourceStat, SourceLocation};


fn unique_temp_path(suffix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!("xpv_{suffix}_{}_{}", process::id(), nanos));
    path
}

fn config_with_root(root: &Path) -> Config {
    let mut config = Config::default();
    config.cache.root = Some(root.to_path_buf());
    config
}

fn cache_dir_count(root: &Path) -> usize {
    fs::read_dir(root)
        .map(|entries| entries.flatten().count())
        .unwrap_or(0)
}

fn write_source(suffix: &str, bytes: &[u8]) -> PathBuf {
    let path = unique_temp_path(suffix);
    fs::write(&path, bytes).expect("source should be written");
    path
}

fn remove_if_exists(path: &Path) {
    if path.is_dir() {
        fs::remove_dir_all(path).expect("test dir should be removed");
    } else if path.exists() {
        fs::remove_file(path).expect("test file should be removed");
    }
}

#[derive(Debug, Clone)]
struct RecordedRender {
    source: PathBuf,
    output_dir: PathBuf,
    source_existed: bool,
}

enum Behavior {
    WritePages(usize),
    Fail { code: i32, stderr: &'static str },
    WaitForCancel,
    /// Swaps the source file for a non-empty directory of the same name.
    ReplaceSourceWithDir,
}

struct RecordingRasterizer {
    behavior: Behavior,
    calls: Mutex<Vec<RecordedRender>>,
}

impl RecordingRasterizer {
    fn writing_pages(pages: usize) -> Self {
        Self::with_behavior(Behavior::WritePages(pages))
    }

    fn failing(code: i32, stderr: &'static str) -> Self {
        Self::with_behavior(Behavior::Fail { code, stderr })
    }

    fn waiting_for_cancel() -> Self {
        Self::with_behavior(Behavior::WaitForCancel)
    }

    fn replacing_source_with_dir() -> Self {
        Self::with_behavior(Behavior::ReplaceSourceWithDir)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<RecordedRender> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Rasterizer for RecordingRasterizer {
    fn name(&self) -> &str {
        "recording"
    }

    fn render<'a>(&'a self, request: RenderRequest<'a>) -> BoxFuture<'a, AppResult<()>> {
        Box::pin(async move {
            self.calls.lock().expect("calls lock").push(RecordedRender {
                source: request.source.to_path_buf(),
                output_dir: request.output_dir.to_path_buf(),
                source_existed: request.source.is_file(),
            });

            match self.behavior {
                Behavior::WritePages(pages) => {
                    // Written out of order on purpose.
                    for page in (1..=pages).rev() {
                        fs::write(request.output_dir.join(format!("page-{page}.png")), b"png")?;
                    }
                    Ok(())
                }
                Behavior::Fail { code, stderr } => {
                    fs::write(request.output_dir.join("page-1.png"), b"partial")?;
                    Err(AppError::render(Some(code), stderr))
                }
                Behavior::WaitForCancel => {
                    fs::write(request.output_dir.join("page-1.png"), b"partial")?;
                    request.cancel.canceled().await;
                    Err(AppError::Canceled)
                }
                Behavior::ReplaceSourceWithDir => {
                    fs::write(request.output_dir.join("page-1.png"), b"png")?;
                    fs::remove_file(request.source)?;
                    fs::create_dir(request.source)?;
                    fs::write(request.source.join("pinned"), b"x")?;
                    Ok(())
                }
            }
        })
    }
}

/// Local paths go to disk; every other scheme is served from memory.
#[derive(Default)]
struct MemoryResourceFs {
    files: HashMap<String, Vec<u8>>,
    fail_copy: bool,
}

impl MemoryResourceFs {
    fn with_file(uri: &str, bytes: &[u8]) -> Self {
        let mut files = HashMap::new();
        files.insert(uri.to_string(), bytes.to_vec());
        Self {
            files,
            fail_copy: false,
        }
    }
}

impl ResourceFs for MemoryResourceFs {
    fn stat(&self, location: &SourceLocation) -> AppResult<Option<ResourceStat>> {
        if location.is_local() {
            return LocalResourceFs.stat(location);
        }
        Ok(self
            .files
            .get(&location.to_string())
            .map(|bytes| ResourceStat::file(bytes.len() as u64)))
    }

    fn copy_to_local(&self, location: &SourceLocation, dest: &Path) -> AppResult<u64> {
        if location.is_local() {
            return LocalResourceFs.copy_to_local(location, dest);
        }
        if self.fail_copy {
            return Err(AppError::copy(
                location.to_string(),
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "remote went away"),
            ));
        }
        let Some(bytes) = self.files.get(&location.to_string()) else {
            return Err(AppError::copy(
                location.to_string(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such remote file"),
            ));
        };
        fs::write(dest, bytes).map_err(|err| AppError::copy(location.to_string(), err))?;
        Ok(bytes.len() as u64)
    }
}
