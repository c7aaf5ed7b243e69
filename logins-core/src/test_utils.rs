//! Test helper module
//!
//! Provides mock implementations and convenient test factory methods.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{LoginsError, LoginsResult};
use crate::services::{LoginService, LoginSyncService, LoginsContext, SyncConfig};
use crate::store::MemoryLoginStore;
use crate::traits::{Clock, LoginUploader};
use crate::types::{Guid, Login, ProtectionSpace, Timestamp};

// ===== ManualClock =====

/// Clock that only moves when told to
#[derive(Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

// ===== RecordingUploader =====

/// Uploader that records every batch and answers with increasing server timestamps
pub struct RecordingUploader {
    records: RwLock<Vec<Vec<Login>>>,
    deletions: RwLock<Vec<Vec<Guid>>>,
    server_time: AtomicU64,
    /// If Some, `upload_records` fails with this message starting at the given call (0-based)
    records_error: RwLock<Option<(usize, String)>>,
}

impl RecordingUploader {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            deletions: RwLock::new(Vec::new()),
            server_time: AtomicU64::new(10_000),
            records_error: RwLock::new(None),
        }
    }

    pub async fn fail_records_from(&self, call: usize, msg: &str) {
        *self.records_error.write().await = Some((call, msg.to_string()));
    }

    pub async fn record_batches(&self) -> Vec<Vec<Login>> {
        self.records.read().await.clone()
    }

    pub async fn deletion_batches(&self) -> Vec<Vec<Guid>> {
        self.deletions.read().await.clone()
    }

    fn next_server_time(&self) -> Timestamp {
        self.server_time.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl LoginUploader for RecordingUploader {
    async fn upload_records(&self, logins: &[Login]) -> LoginsResult<Timestamp> {
        let mut records = self.records.write().await;
        if let Some((from, ref msg)) = *self.records_error.read().await {
            if records.len() >= from {
                return Err(LoginsError::Sync(msg.clone()));
            }
        }
        records.push(logins.to_vec());
        Ok(self.next_server_time())
    }

    async fn upload_deletions(&self, guids: &[Guid]) -> LoginsResult<Timestamp> {
        self.deletions.write().await.push(guids.to_vec());
        Ok(self.next_server_time())
    }
}

// ===== Factory methods =====

/// Protection space for `https://{host}`
pub fn space(host: &str) -> ProtectionSpace {
    ProtectionSpace::new(host, 443, Some("https".to_string()))
}

/// A fresh login for `https://{host}`
pub fn test_login(host: &str, username: Option<&str>, password: &str) -> Login {
    Login::new(
        format!("https://{host}"),
        space(host),
        username.map(str::to_string),
        password,
    )
}

/// Create an empty store driven by a manual clock starting at 0
pub fn create_test_store() -> (MemoryLoginStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let store = MemoryLoginStore::with_clock(clock.clone());
    (store, clock)
}

/// Create a test `LoginsContext`
pub fn create_test_context() -> (
    Arc<LoginsContext>,
    Arc<MemoryLoginStore>,
    Arc<RecordingUploader>,
    Arc<ManualClock>,
) {
    let clock = Arc::new(ManualClock::new(1_000));
    let store = Arc::new(MemoryLoginStore::with_clock(clock.clone()));
    let uploader = Arc::new(RecordingUploader::new());

    let ctx = Arc::new(LoginsContext::new(store.clone(), uploader.clone()));

    (ctx, store, uploader, clock)
}

/// Create a test `LoginService`
pub fn create_test_login_service() -> (LoginService, Arc<MemoryLoginStore>, Arc<ManualClock>) {
    let (ctx, store, _, clock) = create_test_context();
    (LoginService::new(ctx), store, clock)
}

/// Create a test `LoginSyncService` uploading in batches of `batch_size`
pub fn create_test_sync_service(
    batch_size: usize,
) -> (
    LoginSyncService,
    Arc<MemoryLoginStore>,
    Arc<RecordingUploader>,
) {
    let (ctx, store, uploader, _) = create_test_context();
    let service = LoginSyncService::new(ctx, SyncConfig { batch_size });
    (service, store, uploader)
}
