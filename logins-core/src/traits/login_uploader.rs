//! Sync target abstract Trait

use async_trait::async_trait;

use crate::error::LoginsResult;
use crate::types::{Guid, Login, Timestamp};

/// Remote collection logins are uploaded to
///
/// Platform implementation lives with the sync engine; the core only
/// drives it.
#[async_trait]
pub trait LoginUploader: Send + Sync {
    /// Upload changed logins
    ///
    /// # Returns
    /// The server's modification timestamp for the batch
    async fn upload_records(&self, logins: &[Login]) -> LoginsResult<Timestamp>;

    /// Upload tombstones for removed logins
    ///
    /// # Returns
    /// The server's modification timestamp for the batch
    async fn upload_deletions(&self, guids: &[Guid]) -> LoginsResult<Timestamp>;
}
