//! Synchronization bookkeeping types

use serde::{Deserialize, Serialize};

use super::login::Guid;
use crate::utils::timestamp::Timestamp;

/// Local change state of a stored login
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Created locally, never uploaded
    New,
    /// Uploaded before, changed locally since
    Changed,
    /// Matches what the server last acknowledged
    Synced,
}

impl SyncStatus {
    /// Whether the login must be part of the next upload
    #[must_use]
    pub fn needs_upload(self) -> bool {
        !matches!(self, Self::Synced)
    }

    /// Status after a local modification
    #[must_use]
    pub fn after_local_change(self) -> Self {
        match self {
            Self::New => Self::New,
            Self::Changed | Self::Synced => Self::Changed,
        }
    }
}

/// Result of a batch removal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRemoveResult {
    /// Number of logins removed
    pub success_count: usize,
    /// Number of guids that could not be removed
    pub failed_count: usize,
    /// Details about each failed removal
    pub failures: Vec<BatchRemoveFailure>,
}

impl BatchRemoveResult {
    /// Whether every requested guid was removed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_count == 0
    }
}

/// A single failed removal within a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRemoveFailure {
    pub guid: Guid,
    /// Human-readable reason for the failure
    pub reason: String,
}

/// Outcome of one upload round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    /// Logins uploaded and marked synchronized
    pub uploaded: usize,
    /// Tombstones uploaded and cleared
    pub deleted: usize,
    /// Server timestamp of the last acknowledged batch, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_modified: Option<Timestamp>,
}
