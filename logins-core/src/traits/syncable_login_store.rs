//! Synchronization bookkeeping Trait

use async_trait::async_trait;

use super::LoginStore;
use crate::error::LoginsResult;
use crate::types::{Guid, Login, Timestamp};

/// Change tracking a login store needs to take part in sync
///
/// Answers "what changed since the last successful upload" and records the
/// outcome of each upload.
#[async_trait]
pub trait SyncableLoginStore: LoginStore {
    /// Logins created or changed locally since their last upload
    ///
    /// The store remembers the state it handed out, so `mark_synchronized`
    /// can keep changes made during the upload pending.
    async fn pending_upload_modifications(&self) -> LoginsResult<Vec<Login>>;

    /// Guids removed locally whose removal hasn't been uploaded, in removal order
    async fn pending_upload_deletions(&self) -> LoginsResult<Vec<Guid>>;

    /// Whether any login has been synchronized since the account was connected
    async fn has_synced_records(&self) -> LoginsResult<bool>;

    /// Apply a deletion that arrived from the server
    ///
    /// # Arguments
    /// * `guid` - Deleted login; unknown guids are ignored
    /// * `deleted_at` - Server time of the deletion
    async fn mark_deleted(&self, guid: &str, deleted_at: Timestamp) -> LoginsResult<()>;

    /// Mark uploaded logins as synchronized
    ///
    /// Logins changed since they were handed out stay pending; handed-out
    /// logins removed in the meantime get a tombstone.
    ///
    /// # Returns
    /// The applied server timestamp
    async fn mark_synchronized(&self, guids: &[Guid], modified: Timestamp)
        -> LoginsResult<Timestamp>;

    /// Clear tombstones whose deletion has been uploaded
    async fn mark_as_deleted(&self, guids: &[Guid]) -> LoginsResult<()>;

    /// Reset all sync state after the owning account was disconnected
    async fn on_account_removed(&self) -> LoginsResult<()>;
}
