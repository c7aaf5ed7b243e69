//! Type definitions

mod login;
mod sync;

pub use login::{Guid, Login, LoginUpdate, LoginUsageData, ProtectionSpace};
pub use sync::{BatchRemoveFailure, BatchRemoveResult, SyncStatus, SyncSummary};

pub use crate::utils::timestamp::Timestamp;
