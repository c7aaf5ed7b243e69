//! Business logic service layer

mod login_service;
mod sync_service;

pub use login_service::{LoginService, SaveOutcome};
pub use sync_service::{LoginSyncService, SyncConfig};

use std::sync::Arc;

use crate::error::LoginsError;
use crate::traits::{LoginUploader, SyncableLoginStore};

/// Service context - holds all dependencies
///
/// The embedding platform builds this context and injects its store and
/// sync target; nothing in the core is a global.
pub struct LoginsContext {
    /// Login store
    pub store: Arc<dyn SyncableLoginStore>,
    /// Remote sync target
    pub uploader: Arc<dyn LoginUploader>,
}

impl LoginsContext {
    /// Create a service context
    #[must_use]
    pub fn new(store: Arc<dyn SyncableLoginStore>, uploader: Arc<dyn LoginUploader>) -> Self {
        Self { store, uploader }
    }
}

/// Log a failed operation at `warn` for expected outcomes, `error` otherwise
pub(crate) fn log_failure(operation: &str, err: &LoginsError) {
    if err.is_expected() {
        log::warn!("{operation} failed: {err}");
    } else {
        log::error!("{operation} failed: {err}");
    }
}
