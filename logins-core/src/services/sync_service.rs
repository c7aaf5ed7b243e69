//! Login sync service
//!
//! Runs one upload round: pending modifications and tombstones go to the
//! injected `LoginUploader` in batches, and each acknowledged batch is
//! recorded back in the store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{log_failure, LoginsContext};
use crate::error::{LoginsError, LoginsResult};
use crate::types::{Guid, SyncSummary, Timestamp};
use crate::utils::timestamp::to_datetime;

fn default_batch_size() -> usize {
    50
}

/// Sync settings, embeddable in the application's own settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Maximum number of logins or tombstones per upload request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl SyncConfig {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> LoginsResult<Self> {
        serde_json::from_str(json).map_err(|e| LoginsError::Config(e.to_string()))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

/// Login sync service
pub struct LoginSyncService {
    ctx: Arc<LoginsContext>,
    config: SyncConfig,
}

impl LoginSyncService {
    /// Create a sync service instance
    #[must_use]
    pub fn new(ctx: Arc<LoginsContext>, config: SyncConfig) -> Self {
        Self { ctx, config }
    }

    /// Whether there is anything to upload
    pub async fn needs_sync(&self) -> LoginsResult<bool> {
        let store = &self.ctx.store;
        Ok(!store.pending_upload_modifications().await?.is_empty()
            || !store.pending_upload_deletions().await?.is_empty())
    }

    /// Upload local changes
    ///
    /// Batches are acknowledged one at a time, so a failure part-way keeps
    /// everything already uploaded marked as synchronized and leaves the rest
    /// pending for the next round.
    pub async fn sync(&self) -> LoginsResult<SyncSummary> {
        let store = &self.ctx.store;
        let batch_size = self.config.batch_size.max(1);
        let mut summary = SyncSummary::default();

        let modified = store.pending_upload_modifications().await?;
        for batch in modified.chunks(batch_size) {
            let server_modified = self
                .ctx
                .uploader
                .upload_records(batch)
                .await
                .inspect_err(|e| log_failure("Uploading logins", e))?;
            let guids: Vec<Guid> = batch.iter().map(|l| l.guid().to_string()).collect();
            store.mark_synchronized(&guids, server_modified).await?;
            summary.uploaded += batch.len();
            summary.server_modified = Some(server_modified);
        }

        let deleted = store.pending_upload_deletions().await?;
        for batch in deleted.chunks(batch_size) {
            let server_modified = self
                .ctx
                .uploader
                .upload_deletions(batch)
                .await
                .inspect_err(|e| log_failure("Uploading deletions", e))?;
            store.mark_as_deleted(batch).await?;
            summary.deleted += batch.len();
            summary.server_modified = Some(server_modified);
        }

        log::info!(
            "Sync round complete: {} uploaded, {} deletions, server time {}",
            summary.uploaded,
            summary.deleted,
            summary
                .server_modified
                .and_then(to_datetime)
                .map_or_else(|| "unchanged".to_string(), |dt| dt.to_rfc3339())
        );
        Ok(summary)
    }

    /// Apply deletions received from the server
    pub async fn apply_remote_deletions(
        &self,
        deletions: &[(Guid, Timestamp)],
    ) -> LoginsResult<()> {
        for (guid, deleted_at) in deletions {
            self.ctx.store.mark_deleted(guid, *deleted_at).await?;
        }
        log::info!("Applied {} remote deletions", deletions.len());
        Ok(())
    }

    /// Whether this store has synchronized since the account was connected
    pub async fn has_synced(&self) -> LoginsResult<bool> {
        self.ctx.store.has_synced_records().await
    }

    /// Forget all sync state after the account was disconnected
    pub async fn disconnect(&self) -> LoginsResult<()> {
        self.ctx.store.on_account_removed().await?;
        log::info!("Sync account disconnected, login sync state reset");
        Ok(())
    }
}
