use std::path::Path;
use std::sync::Arc;

use crate::backend::{CancelToken, Rasterizer, RenderRequest};
use crate::cache::CacheDir;
use crate::error::{AppError, AppResult};
use crate::source::{LocalCopy, ResourceFs, SourceLocation};

/// Renders an effective source into a cache directory, materializing
/// non-local sources as a temporary local file for the duration of the run.
pub struct RenderInvoker {
    rasterizer: Arc<dyn Rasterizer>,
    resources: Arc<dyn ResourceFs>,
    temp_source_name: String,
}

impl RenderInvoker {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        resources: Arc<dyn ResourceFs>,
        temp_source_name: impl Into<String>,
    ) -> Self {
        Self {
            rasterizer,
            resources,
            temp_source_name: temp_source_name.into(),
        }
    }

    pub async fn render(
        &self,
        cache_dir: &CacheDir,
        effective: &SourceLocation,
        cancel: &CancelToken,
    ) -> AppResult<()> {
        if cancel.is_canceled() {
            return Err(AppError::Canceled);
        }

        if let SourceLocation::Local(path) = effective {
            return self.rasterize(path, cache_dir.path(), cancel).await;
        }

        let copy = LocalCopy::materialize(
            Arc::clone(&self.resources),
            effective,
            cache_dir.path().join(&self.temp_source_name),
        )
        .await?;
        let rendered = self.rasterize(copy.path(), cache_dir.path(), cancel).await;
        let removed = copy.remove().await;

        match (rendered, removed) {
            (Ok(()), removed) => removed,
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(remove_err)) => {
                tracing::warn!(error = %remove_err, "local copy left behind after failed render");
                Err(err)
            }
        }
    }

    async fn rasterize(
        &self,
        source: &Path,
        output_dir: &Path,
        cancel: &CancelToken,
    ) -> AppResult<()> {
        tracing::debug!(
            rasterizer = self.rasterizer.name(),
            source = %source.display(),
            "rendering document"
        );
        self.rasterizer
            .render(RenderRequest {
                source,
                output_dir,
                cancel,
            })
            .await
    }
}
