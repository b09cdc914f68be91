use std::path::{Path, PathBuf};

use crate::cache::CacheDir;
use crate::error::AppResult;
use crate::source::SourceLocation;

/// An open document and the rendered pages that belong to it.
///
/// Only produced after a successful render (or for an empty source, with no
/// cache directory). Disposal consumes the handle.
#[derive(Debug)]
pub struct DocumentHandle {
    source: SourceLocation,
    effective_source: Option<SourceLocation>,
    cache_dir: Option<CacheDir>,
}

impl DocumentHandle {
    pub(crate) fn empty(source: SourceLocation) -> Self {
        Self {
            source,
            effective_source: None,
            cache_dir: None,
        }
    }

    pub(crate) fn rendered(
        source: SourceLocation,
        effective_source: SourceLocation,
        cache_dir: CacheDir,
    ) -> Self {
        Self {
            source,
            effective_source: Some(effective_source),
            cache_dir: Some(cache_dir),
        }
    }

    pub fn source(&self) -> &SourceLocation {
        &self.source
    }

    pub fn effective_source(&self) -> Option<&SourceLocation> {
        self.effective_source.as_ref()
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_ref().map(CacheDir::path)
    }

    pub fn cache_dir_name(&self) -> Option<&str> {
        self.cache_dir.as_ref().map(CacheDir::name)
    }

    pub fn is_empty(&self) -> bool {
        self.cache_dir.is_none()
    }

    /// Removes the cache directory, reporting failure to the caller.
    pub async fn release(self) -> AppResult<()> {
        match self.cache_dir {
            Some(cache_dir) => cache_dir.release().await,
            None => Ok(()),
        }
    }

    /// Host-side teardown: removal failures are logged, never returned.
    pub async fn dispose(self) {
        let source = self.source.to_string();
        if let Err(err) = self.release().await {
            tracing::warn!(source = %source, error = %err, "failed to dispose document cache");
        }
    }

    /// Detaches the cache directory so it outlives the handle.
    pub fn keep(self) -> Option<PathBuf> {
        self.cache_dir.map(CacheDir::keep)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::DocumentHandle;
    use crate::cache::CacheRoot;
    use crate::error::AppError;
    use crate::source::SourceLocation;

    fn unique_temp_path(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("xpv_handle_{suffix}_{}_{}", process::id(), nanos));
        path
    }

    fn source() -> SourceLocation {
        SourceLocation::Local(PathBuf::from("/notes/a.xopp"))
    }

    #[tokio::test]
    async fn dispose_removes_the_cache_directory() {
        let root_path = unique_temp_path("dispose");
        let root = CacheRoot::new(&root_path);
        let dir = root.allocate().expect("allocation should succeed");
        fs::write(dir.path().join("page-1.png"), b"png").expect("page should be written");

        let handle = DocumentHandle::rendered(source(), source(), dir);
        let dir_path = handle.cache_dir().expect("handle should own a dir").to_path_buf();
        assert!(!handle.is_empty());
        assert!(handle.cache_dir_name().is_some_and(|name| name.starts_with("doc-")));

        handle.dispose().await;
        assert!(!dir_path.exists());
        assert_eq!(root.live_count(), 0);

        fs::remove_dir_all(&root_path).expect("root should be removed");
    }

    #[tokio::test]
    async fn disposing_an_empty_handle_is_a_no_op() {
        let handle = DocumentHandle::empty(source());
        assert!(handle.is_empty());
        assert_eq!(handle.cache_dir(), None);
        assert_eq!(handle.effective_source(), None);
        handle.release().await.expect("empty release should succeed");
    }

    #[tokio::test]
    async fn externally_removed_directory_still_releases_cleanly() {
        let root_path = unique_temp_path("external");
        let root = CacheRoot::new(&root_path);
        let dir = root.allocate().expect("allocation should succeed");
        fs::remove_dir_all(dir.path()).expect("dir should be removed externally");

        let handle = DocumentHandle::rendered(source(), source(), dir);
        handle.release().await.expect("missing dir should not be an error");

        fs::remove_dir_all(&root_path).expect("root should be removed");
    }

    #[tokio::test]
    async fn removal_failure_is_returned_by_release_and_logged_by_dispose() {
        let root_path = unique_temp_path("blocked");
        let root = CacheRoot::new(&root_path);

        let released = root.allocate().expect("allocation should succeed");
        let released_path = released.path().to_path_buf();
        fs::remove_dir(&released_path).expect("dir should be removed externally");
        fs::write(&released_path, b"not a dir").expect("file should replace the dir");
        let err = DocumentHandle::rendered(source(), source(), released)
            .release()
            .await
            .expect_err("removing a file as a directory should fail");
        assert!(matches!(err, AppError::Storage { .. }));
        assert!(released_path.is_file());

        let disposed = root.allocate().expect("allocation should succeed");
        let disposed_path = disposed.path().to_path_buf();
        fs::remove_dir(&disposed_path).expect("dir should be removed externally");
        fs::write(&disposed_path, b"not a dir").expect("file should replace the dir");
        DocumentHandle::rendered(source(), source(), disposed)
            .dispose()
            .await;
        assert!(disposed_path.is_file());
        assert_eq!(root.live_count(), 0);

        fs::remove_dir_all(&root_path).expect("root should be removed");
    }

    #[test]
    fn keep_detaches_the_directory() {
        let root_path = unique_temp_path("keep");
        let root = CacheRoot::new(&root_path);
        let dir = root.allocate().expect("allocation should succeed");

        let kept = DocumentHandle::rendered(source(), source(), dir)
            .keep()
            .expect("rendered handle should have a dir");
        assert!(kept.is_dir());
        assert_eq!(root.live_count(), 0);

        fs::remove_dir_all(&root_path).expect("root should be removed");
    }
}
