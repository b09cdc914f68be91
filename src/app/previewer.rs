use std::sync::Arc;

use crate::backend::{CancelToken, Rasterizer, open_default_rasterizer};
use crate::cache::{CacheRoot, ReapReport};
use crate::config::Config;
use crate::document::{DocumentHandle, OpenContext, RenderInvoker};
use crate::error::{AppError, AppResult};
use crate::pages::{PageArtifact, list_ordered};
use crate::presenter::{ResourceUrlMapper, VirtualUrlMapper, render_document_view};
use crate::source::{LocalResourceFs, ResourceFs, ResourceStat, SourceLocation};

/// Read-only preview provider: opens documents into render caches and
/// turns them into page views.
pub struct Previewer {
    config: Config,
    cache_root: CacheRoot,
    resources: Arc<dyn ResourceFs>,
    invoker: RenderInvoker,
}

impl Previewer {
    pub fn new(config: Config) -> Self {
        let rasterizer = open_default_rasterizer(&config.renderer);
        Self::with_parts(config, rasterizer, Arc::new(LocalResourceFs))
    }

    pub fn with_parts(
        config: Config,
        rasterizer: Arc<dyn Rasterizer>,
        resources: Arc<dyn ResourceFs>,
    ) -> Self {
        let cache_root = CacheRoot::from_config(&config.cache);
        let invoker = RenderInvoker::new(
            rasterizer,
            Arc::clone(&resources),
            config.renderer.temp_source_name.clone(),
        );
        Self {
            config,
            cache_root,
            resources,
            invoker,
        }
    }

    pub fn cache_root(&self) -> &CacheRoot {
        &self.cache_root
    }

    /// Renders `uri` (or the backup named in `context`) into a fresh cache
    /// directory. Empty or missing sources open without rendering.
    pub async fn open(
        &self,
        uri: &str,
        context: &OpenContext,
        cancel: &CancelToken,
    ) -> AppResult<DocumentHandle> {
        let source = SourceLocation::parse(uri)?;
        let stat = self.stat(&source).await?;
        if !stat.is_some_and(|stat| stat.has_content()) {
            tracing::info!(source = %source, "source is empty or missing, nothing to render");
            return Ok(DocumentHandle::empty(source));
        }
        if cancel.is_canceled() {
            return Err(AppError::Canceled);
        }

        let effective = match context.backup_id.as_deref() {
            Some(backup_id) => SourceLocation::parse(backup_id)?,
            None => source.clone(),
        };
        let cache_dir = self.cache_root.allocate()?;

        if let Err(err) = self.invoker.render(&cache_dir, &effective, cancel).await {
            let dir = cache_dir.path().display().to_string();
            if let Err(release_err) = cache_dir.release().await {
                tracing::warn!(
                    dir = %dir,
                    error = %release_err,
                    "failed to release cache after render failure"
                );
            }
            return Err(err);
        }

        tracing::info!(
            source = %source,
            effective = %effective,
            dir = %cache_dir.path().display(),
            "document rendered"
        );
        Ok(DocumentHandle::rendered(source, effective, cache_dir))
    }

    pub fn pages(&self, handle: &DocumentHandle) -> AppResult<Vec<PageArtifact>> {
        match handle.cache_dir() {
            Some(dir) => list_ordered(dir, &self.config.cache.page_extensions),
            None => Ok(Vec::new()),
        }
    }

    pub fn url_mapper(&self) -> AppResult<VirtualUrlMapper> {
        VirtualUrlMapper::new(&self.config.view.resource_base_url)
    }

    pub fn page_view(
        &self,
        handle: &DocumentHandle,
        mapper: &dyn ResourceUrlMapper,
    ) -> AppResult<String> {
        let pages = self.pages(handle)?;
        render_document_view(handle, &pages, mapper, &self.config.zoom)
    }

    pub fn reap_orphans(&self) -> AppResult<ReapReport> {
        self.cache_root
            .reap_orphans(self.config.cache.orphan_min_age())
    }

    async fn stat(&self, source: &SourceLocation) -> AppResult<Option<ResourceStat>> {
        let resources = Arc::clone(&self.resources);
        let location = source.clone();
        tokio::task::spawn_blocking(move || resources.stat(&location))
            .await
            .map_err(|join_err| {
                AppError::io_with_context(
                    std::io::Error::other(join_err),
                    format!("failed to stat {source}"),
                )
            })?
    }
}
