mod handle;
mod invoker;

pub use handle::DocumentHandle;
pub use invoker::RenderInvoker;

/// Host-supplied context for one open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenContext {
    /// Reference to a backup revision that replaces the nominal location.
    pub backup_id: Option<String>,
}

impl OpenContext {
    pub fn with_backup(backup_id: impl Into<String>) -> Self {
        Self {
            backup_id: Some(backup_id.into()),
        }
    }
}
