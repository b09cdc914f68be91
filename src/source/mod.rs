mod fs;
mod local_copy;
mod location;

pub use fs::{LocalResourceFs, ResourceFs, ResourceKind, ResourceStat};
pub use local_copy::LocalCopy;
pub use location::SourceLocation;
