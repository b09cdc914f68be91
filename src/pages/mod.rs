mod index;

pub use index::{PageArtifact, list_ordered, page_ordinal};
