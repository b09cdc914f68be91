mod html;
mod resource_url;

pub use html::{render_document_view, render_page_view};
pub use resource_url::{ResourceUrlMapper, VirtualUrlMapper};
