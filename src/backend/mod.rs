use std::sync::Arc;

use crate::config::RendererConfig;

mod cancel;
mod traits;
mod xournalpp;

pub use cancel::CancelToken;
pub use traits::{Rasterizer, RenderRequest};
pub use xournalpp::XournalppRasterizer;

pub fn open_default_rasterizer(config: &RendererConfig) -> Arc<dyn Rasterizer> {
    Arc::new(XournalppRasterizer::from_config(config))
}
