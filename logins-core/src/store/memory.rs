//! In-memory login store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{LoginsError, LoginsResult};
use crate::files::FileAccessor;
use crate::traits::{Clock, LoginStore, SyncableLoginStore, SystemClock};
use crate::types::{
    BatchRemoveFailure, BatchRemoveResult, Guid, Login, LoginUpdate, LoginUsageData,
    ProtectionSpace, SyncStatus, Timestamp,
};
use crate::utils::log_sanitizer::{mask_username, truncate_for_log};

/// A login plus its change-tracking state
#[derive(Debug, Clone)]
struct StoredLogin {
    login: Login,
    status: SyncStatus,
    /// Server timestamp of the last acknowledged upload
    server_modified: Option<Timestamp>,
    /// Store-wide change counter value of the last local change
    version: u64,
}

impl StoredLogin {
    fn new(login: Login, version: u64) -> Self {
        Self {
            login,
            status: SyncStatus::New,
            server_modified: None,
            version,
        }
    }

    fn reached_server(&self) -> bool {
        self.server_modified.is_some()
    }

    fn mark_changed(&mut self, version: u64) {
        self.status = self.status.after_local_change();
        self.version = version;
    }
}

#[derive(Debug, Default)]
struct StoreState {
    /// Insertion order
    logins: Vec<StoredLogin>,
    /// Guids removed locally and not yet uploaded, in removal order
    tombstones: Vec<Guid>,
    /// Versions handed out by `pending_upload_modifications`, by guid, until acknowledged
    in_flight: HashMap<Guid, u64>,
    change_counter: u64,
    has_synced: bool,
}

impl StoreState {
    fn next_version(&mut self) -> u64 {
        self.change_counter += 1;
        self.change_counter
    }

    fn position_by_guid(&self, guid: &str) -> Option<usize> {
        self.logins.iter().position(|s| s.login.guid() == guid)
    }

    fn position_of(&self, login: &Login) -> Option<usize> {
        self.logins.iter().position(|s| s.login == *login)
    }

    fn push_tombstone(&mut self, guid: &str) {
        if !self.tombstones.iter().any(|g| g == guid) {
            self.tombstones.push(guid.to_string());
        }
    }

    /// Drop a login, leaving a tombstone if the server has seen it
    fn remove_at(&mut self, index: usize) -> StoredLogin {
        let removed = self.logins.remove(index);
        if removed.reached_server() {
            self.push_tombstone(removed.login.guid());
        }
        removed
    }

    fn logins_cloned<F>(&self, filter: F) -> Vec<Login>
    where
        F: Fn(&Login) -> bool,
    {
        self.logins
            .iter()
            .map(|s| &s.login)
            .filter(|l| filter(*l))
            .cloned()
            .collect()
    }
}

fn sort_by_last_used_desc(logins: &mut [Login]) {
    logins.sort_by(|a, b| b.time_last_used().cmp(&a.time_last_used()));
}

fn sort_by_hostname_desc(logins: &mut [Login]) {
    logins.sort_by(|a, b| b.hostname.cmp(&a.hostname));
}

/// In-process login store.
///
/// Reference implementation of [`LoginStore`] and [`SyncableLoginStore`]:
/// queries share a read lock, mutations take the write lock, so every
/// mutation observes and produces one linear history. Change tracking is a
/// per-login [`SyncStatus`] plus a tombstone list for removals of logins the
/// server has already seen.
pub struct MemoryLoginStore {
    state: RwLock<StoreState>,
    clock: Arc<dyn Clock>,
}

impl MemoryLoginStore {
    /// Create an empty store. The file accessor is not used by the in-memory store.
    #[must_use]
    pub fn new(files: &FileAccessor) -> Self {
        log::debug!(
            "Creating in-memory login store (ignoring root {})",
            files.root_path().display()
        );
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store using `clock` for usage metadata
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            clock,
        }
    }

    /// Number of stored logins
    pub async fn len(&self) -> usize {
        self.state.read().await.logins.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.logins.is_empty()
    }
}

impl Default for MemoryLoginStore {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

#[async_trait]
impl LoginStore for MemoryLoginStore {
    async fn find_by_protection_space(&self, space: &ProtectionSpace) -> LoginsResult<Vec<Login>> {
        let mut logins = self
            .state
            .read()
            .await
            .logins_cloned(|l| l.protection_space.host == space.host);
        sort_by_last_used_desc(&mut logins);
        log::debug!("Found {} logins for host {}", logins.len(), space.host);
        Ok(logins)
    }

    async fn find_by_protection_space_and_username(
        &self,
        space: &ProtectionSpace,
        username: Option<&str>,
    ) -> LoginsResult<Vec<Login>> {
        let mut logins = self.state.read().await.logins_cloned(|l| {
            l.protection_space.host == space.host && l.username.as_deref() == username
        });
        sort_by_last_used_desc(&mut logins);
        log::debug!(
            "Found {} logins for host {} and username {}",
            logins.len(),
            space.host,
            mask_username(username)
        );
        Ok(logins)
    }

    async fn find_by_guid(&self, guid: &str) -> LoginsResult<Login> {
        let state = self.state.read().await;
        state
            .position_by_guid(guid)
            .map(|i| state.logins[i].login.clone())
            .ok_or_else(|| LoginsError::NotFound(guid.to_string()))
    }

    async fn find_all(&self) -> LoginsResult<Vec<Login>> {
        let mut logins = self.state.read().await.logins_cloned(|_| true);
        sort_by_hostname_desc(&mut logins);
        Ok(logins)
    }

    async fn search(&self, query: Option<&str>) -> LoginsResult<Vec<Login>> {
        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return Ok(Vec::new());
        };
        let mut logins = self
            .state
            .read()
            .await
            .logins_cloned(|l| l.matches_query(query));
        sort_by_hostname_desc(&mut logins);
        log::debug!(
            "Search '{}' matched {} logins",
            truncate_for_log(query),
            logins.len()
        );
        Ok(logins)
    }

    async fn usage_data_for_guid(&self, guid: &str) -> LoginsResult<LoginUsageData> {
        self.state
            .read()
            .await
            .logins
            .iter()
            .map(|s| &s.login)
            .filter(|l| l.guid() == guid)
            .max_by_key(|l| l.time_last_used())
            .map(Login::usage_data)
            .ok_or_else(|| LoginsError::NotFound(guid.to_string()))
    }

    async fn add(&self, login: &Login) -> LoginsResult<()> {
        let mut state = self.state.write().await;

        if let Some(i) = state.position_of(login) {
            return Err(LoginsError::AlreadyExists(
                state.logins[i].login.guid().to_string(),
            ));
        }
        if state.position_by_guid(login.guid()).is_some() {
            return Err(LoginsError::AlreadyExists(login.guid().to_string()));
        }

        let mut login = login.clone();
        login.stamp_inserted(self.clock.now());
        state.tombstones.retain(|g| g != login.guid());
        log::debug!("Adding login {} for {}", login.guid(), login.hostname);
        let version = state.next_version();
        state.logins.push(StoredLogin::new(login, version));
        Ok(())
    }

    async fn update_by_guid(
        &self,
        guid: &str,
        update: &LoginUpdate,
        significant: bool,
    ) -> LoginsResult<()> {
        let mut state = self.state.write().await;
        let index = state
            .position_by_guid(guid)
            .ok_or_else(|| LoginsError::NotFound(guid.to_string()))?;

        let mut updated = state.logins[index].login.clone();
        update.apply_to(&mut updated);

        let collision = state
            .logins
            .iter()
            .enumerate()
            .find(|(i, s)| *i != index && s.login == updated);
        if let Some((_, existing)) = collision {
            return Err(LoginsError::AlreadyExists(existing.login.guid().to_string()));
        }

        let now = self.clock.now();
        if significant {
            updated.touch_password_changed(now);
        }
        updated.touch_modified(now);

        let version = state.next_version();
        let stored = &mut state.logins[index];
        stored.login = updated;
        stored.mark_changed(version);
        log::debug!("Updated login {guid} (significant: {significant})");
        Ok(())
    }

    async fn update(&self, login: &Login) -> LoginsResult<()> {
        let mut state = self.state.write().await;
        let index = state
            .position_of(login)
            .ok_or_else(|| LoginsError::NotYetCached(login.hostname.clone()))?;

        let now = self.clock.now();
        let version = state.next_version();
        let stored = &mut state.logins[index];
        stored.login.touch_password_changed(now);
        stored.login.touch_modified(now);
        stored.mark_changed(version);
        Ok(())
    }

    async fn record_use(&self, guid: &str) -> LoginsResult<()> {
        let mut state = self.state.write().await;
        let index = state
            .position_by_guid(guid)
            .ok_or_else(|| LoginsError::NotYetCached(guid.to_string()))?;

        let now = self.clock.now();
        let version = state.next_version();
        let stored = &mut state.logins[index];
        stored.login.touch_used(now);
        stored.login.touch_modified(now);
        stored.mark_changed(version);
        Ok(())
    }

    async fn remove(&self, guid: &str) -> LoginsResult<()> {
        let mut state = self.state.write().await;
        let index = state
            .position_by_guid(guid)
            .ok_or_else(|| LoginsError::NotStored(guid.to_string()))?;
        state.remove_at(index);
        log::debug!("Removed login {guid}");
        Ok(())
    }

    async fn remove_batch(&self, guids: &[Guid]) -> LoginsResult<BatchRemoveResult> {
        let mut state = self.state.write().await;
        let mut success_count = 0;
        let mut failures = Vec::new();

        for guid in guids {
            if let Some(index) = state.position_by_guid(guid) {
                state.remove_at(index);
                success_count += 1;
            } else {
                failures.push(BatchRemoveFailure {
                    guid: guid.clone(),
                    reason: LoginsError::NotStored(guid.clone()).to_string(),
                });
            }
        }

        log::debug!(
            "Batch removal: {success_count} removed, {} failed",
            failures.len()
        );
        Ok(BatchRemoveResult {
            success_count,
            failed_count: failures.len(),
            failures,
        })
    }

    async fn remove_all(&self) -> LoginsResult<()> {
        let mut state = self.state.write().await;
        let removed = std::mem::take(&mut state.logins);
        for stored in removed.iter().filter(|s| s.reached_server()) {
            state.push_tombstone(stored.login.guid());
        }
        log::debug!("Removed all {} logins", removed.len());
        Ok(())
    }
}

#[async_trait]
impl SyncableLoginStore for MemoryLoginStore {
    async fn pending_upload_modifications(&self) -> LoginsResult<Vec<Login>> {
        let mut state = self.state.write().await;
        let StoreState {
            logins, in_flight, ..
        } = &mut *state;

        let mut pending = Vec::new();
        for stored in logins.iter().filter(|s| s.status.needs_upload()) {
            in_flight.insert(stored.login.guid().to_string(), stored.version);
            pending.push(stored.login.clone());
        }
        Ok(pending)
    }

    async fn pending_upload_deletions(&self) -> LoginsResult<Vec<Guid>> {
        Ok(self.state.read().await.tombstones.clone())
    }

    async fn has_synced_records(&self) -> LoginsResult<bool> {
        Ok(self.state.read().await.has_synced)
    }

    async fn mark_deleted(&self, guid: &str, deleted_at: Timestamp) -> LoginsResult<()> {
        let mut state = self.state.write().await;
        state.tombstones.retain(|g| g != guid);
        state.in_flight.remove(guid);

        let Some(index) = state.position_by_guid(guid) else {
            return Ok(());
        };
        let stored = &state.logins[index];
        if stored.status.needs_upload() && stored.login.time_last_modified() > deleted_at {
            log::info!("Keeping login {guid}: local changes are newer than remote deletion");
            return Ok(());
        }
        state.logins.remove(index);
        log::debug!("Applied remote deletion of {guid}");
        Ok(())
    }

    async fn mark_synchronized(
        &self,
        guids: &[Guid],
        modified: Timestamp,
    ) -> LoginsResult<Timestamp> {
        let mut state = self.state.write().await;
        let mut marked = 0usize;
        let mut changed_since = 0usize;

        for guid in guids {
            let handed_out = state.in_flight.remove(guid);
            match state.position_by_guid(guid) {
                Some(index) => {
                    let stored = &mut state.logins[index];
                    stored.server_modified = Some(modified);
                    // Changed after it was handed out: the server has an older copy
                    if handed_out.is_some_and(|v| v != stored.version) {
                        stored.status = SyncStatus::Changed;
                        changed_since += 1;
                    } else {
                        stored.status = SyncStatus::Synced;
                    }
                    marked += 1;
                }
                // Removed while the upload was in flight
                None if handed_out.is_some() => state.push_tombstone(guid),
                None => {}
            }
        }

        if marked > 0 {
            state.has_synced = true;
        }
        log::debug!(
            "Marked {marked} logins synchronized at {modified} ({changed_since} changed during upload)"
        );
        Ok(modified)
    }

    async fn mark_as_deleted(&self, guids: &[Guid]) -> LoginsResult<()> {
        self.state
            .write()
            .await
            .tombstones
            .retain(|g| !guids.contains(g));
        Ok(())
    }

    async fn on_account_removed(&self) -> LoginsResult<()> {
        let mut state = self.state.write().await;
        for stored in &mut state.logins {
            stored.status = SyncStatus::New;
            stored.server_modified = None;
        }
        state.tombstones.clear();
        state.in_flight.clear();
        state.has_synced = false;
        log::info!("Reset sync state of {} logins", state.logins.len());
        Ok(())
    }
}
