use std::path::Path;

use futures_util::future::BoxFuture;

use crate::error::AppResult;

use super::cancel::CancelToken;

#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Local file to rasterize.
    pub source: &'a Path,
    /// Directory that receives one image per page.
    pub output_dir: &'a Path,
    pub cancel: &'a CancelToken,
}

pub trait Rasterizer: Send + Sync {
    fn name(&self) -> &str;
    fn render<'a>(&'a self, request: RenderRequest<'a>) -> BoxFuture<'a, AppResult<()>>;
}
