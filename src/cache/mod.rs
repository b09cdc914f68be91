mod dir;
mod root;

pub use dir::CacheDir;
pub use root::{CacheRoot, ReapReport};
