//! Login management service
//!
//! Caller-facing operations over the injected store: saving a submitted
//! form, filling a page, tracking use and deleting.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{log_failure, LoginsContext};
use crate::error::LoginsResult;
use crate::types::{BatchRemoveResult, Guid, Login, LoginUpdate, LoginUsageData};
use crate::utils::log_sanitizer::mask_username;

/// What `save_login` did with the submitted credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "guid", rename_all = "lowercase")]
pub enum SaveOutcome {
    /// No login for this site and username existed; one was added
    Added(Guid),
    /// The stored password was replaced
    Updated(Guid),
    /// The same credentials were already stored
    Unchanged(Guid),
}

impl SaveOutcome {
    pub fn guid(&self) -> &str {
        match self {
            Self::Added(guid) | Self::Updated(guid) | Self::Unchanged(guid) => guid,
        }
    }
}

/// Login management service
pub struct LoginService {
    ctx: Arc<LoginsContext>,
}

impl LoginService {
    /// Create a login service instance
    #[must_use]
    pub fn new(ctx: Arc<LoginsContext>) -> Self {
        Self { ctx }
    }

    /// Save credentials submitted on a page
    ///
    /// Adds a login when the site has none for this username, otherwise
    /// replaces the stored password (a significant change).
    pub async fn save_login(
        &self,
        url: &str,
        username: Option<String>,
        password: &str,
    ) -> LoginsResult<SaveOutcome> {
        let candidate = Login::for_url(url, username, password)?;
        let existing = self
            .ctx
            .store
            .find_by_protection_space_and_username(
                &candidate.protection_space,
                candidate.username.as_deref(),
            )
            .await?
            .into_iter()
            .find(|l| l.protection_space == candidate.protection_space);

        let outcome = match existing {
            Some(stored) if stored.password == candidate.password => {
                SaveOutcome::Unchanged(stored.guid().to_string())
            }
            Some(stored) => {
                let update = LoginUpdate {
                    password: Some(candidate.password.clone()),
                    ..LoginUpdate::default()
                };
                self.ctx
                    .store
                    .update_by_guid(stored.guid(), &update, true)
                    .await
                    .inspect_err(|e| log_failure("Updating saved password", e))?;
                SaveOutcome::Updated(stored.guid().to_string())
            }
            None => {
                self.ctx
                    .store
                    .add(&candidate)
                    .await
                    .inspect_err(|e| log_failure("Adding login", e))?;
                SaveOutcome::Added(candidate.guid().to_string())
            }
        };

        log::info!(
            "Saved login for {} (user {}): {outcome:?}",
            candidate.hostname,
            mask_username(candidate.username.as_deref())
        );
        Ok(outcome)
    }

    /// Replace a stored login's fields with those of `edited`
    ///
    /// Counts as a significant change only when the password differs.
    pub async fn edit_login(&self, guid: &str, edited: &Login) -> LoginsResult<()> {
        let stored = self.ctx.store.find_by_guid(guid).await?;
        let significant = stored.password != edited.password;
        self.ctx
            .store
            .update_by_guid(guid, &LoginUpdate::from_login(edited), significant)
            .await
            .inspect_err(|e| log_failure("Editing login", e))?;
        log::info!("Edited login {guid} (password changed: {significant})");
        Ok(())
    }

    /// Logins to offer on a page, most recently used first
    pub async fn logins_for_url(&self, url: &str) -> LoginsResult<Vec<Login>> {
        let space = crate::types::ProtectionSpace::from_url(url)?;
        self.ctx.store.find_by_protection_space(&space).await
    }

    /// Get a login by guid
    pub async fn get_login(&self, guid: &str) -> LoginsResult<Login> {
        self.ctx.store.find_by_guid(guid).await
    }

    /// Every login, hostname descending
    pub async fn list_logins(&self) -> LoginsResult<Vec<Login>> {
        self.ctx.store.find_all().await
    }

    /// Free-text search; an absent query matches nothing
    pub async fn search(&self, query: Option<&str>) -> LoginsResult<Vec<Login>> {
        self.ctx.store.search(query).await
    }

    /// Record that a login was filled into a page
    pub async fn use_login(&self, guid: &str) -> LoginsResult<LoginUsageData> {
        self.ctx
            .store
            .record_use(guid)
            .await
            .inspect_err(|e| log_failure("Recording login use", e))?;
        self.ctx.store.usage_data_for_guid(guid).await
    }

    /// Delete a login
    pub async fn delete_login(&self, guid: &str) -> LoginsResult<()> {
        self.ctx
            .store
            .remove(guid)
            .await
            .inspect_err(|e| log_failure("Deleting login", e))?;
        log::info!("Deleted login {guid}");
        Ok(())
    }

    /// Delete several logins; guids that aren't stored are reported, not fatal
    pub async fn delete_logins(&self, guids: &[Guid]) -> LoginsResult<BatchRemoveResult> {
        let result = self.ctx.store.remove_batch(guids).await?;
        for failure in &result.failures {
            log::warn!("Skipped deleting {}: {}", failure.guid, failure.reason);
        }
        log::info!(
            "Deleted {} logins ({} skipped)",
            result.success_count,
            result.failed_count
        );
        Ok(result)
    }

    /// Delete every login
    pub async fn delete_all_logins(&self) -> LoginsResult<()> {
        self.ctx.store.remove_all().await?;
        log::info!("Deleted all logins");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoginsError;
    use crate::test_utils::create_test_login_service;
    use crate::traits::{LoginStore, SyncableLoginStore};

    #[tokio::test]
    async fn save_new_login_adds() {
        let (svc, store, _) = create_test_login_service();

        let outcome = svc
            .save_login("https://example.com/login", Some("a".to_string()), "p1")
            .await
            .unwrap();

        assert!(matches!(outcome, SaveOutcome::Added(_)));
        let saved = store.find_by_guid(outcome.guid()).await.unwrap();
        assert_eq!(saved.hostname, "https://example.com");
        assert_eq!(saved.protection_space.host, "example.com");
        assert_eq!(saved.password, "p1");
    }

    #[tokio::test]
    async fn save_same_credentials_is_unchanged() {
        let (svc, store, _) = create_test_login_service();

        let first = svc
            .save_login("https://example.com", Some("a".to_string()), "p1")
            .await
            .unwrap();
        let second = svc
            .save_login("https://example.com/other", Some("a".to_string()), "p1")
            .await
            .unwrap();

        assert_eq!(second, SaveOutcome::Unchanged(first.guid().to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn save_new_password_updates() {
        let (svc, store, clock) = create_test_login_service();

        let first = svc
            .save_login("https://example.com", Some("a".to_string()), "p1")
            .await
            .unwrap();
        clock.set(5_000);
        let second = svc
            .save_login("https://example.com", Some("a".to_string()), "p2")
            .await
            .unwrap();

        assert_eq!(second, SaveOutcome::Updated(first.guid().to_string()));
        let stored = store.find_by_guid(first.guid()).await.unwrap();
        assert_eq!(stored.password, "p2");
        assert_eq!(stored.time_password_changed(), 5_000);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn save_other_username_adds_second_login() {
        let (svc, store, _) = create_test_login_service();

        svc.save_login("https://example.com", Some("a".to_string()), "p")
            .await
            .unwrap();
        let outcome = svc
            .save_login("https://example.com", Some("b".to_string()), "p")
            .await
            .unwrap();

        assert!(matches!(outcome, SaveOutcome::Added(_)));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn save_with_bad_url_fails() {
        let (svc, store, _) = create_test_login_service();
        let result = svc.save_login("::nope::", None, "p").await;
        assert!(matches!(result, Err(LoginsError::InvalidProtectionSpace(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn edit_login_replaces_fields() {
        let (svc, store, clock) = create_test_login_service();
        let saved = svc
            .save_login("https://example.com", Some("a".to_string()), "p1")
            .await
            .unwrap();
        let mut edited = store.find_by_guid(saved.guid()).await.unwrap();
        edited.username = Some("b".to_string());
        edited.password_field = Some("pass".to_string());

        clock.set(3_000);
        svc.edit_login(saved.guid(), &edited).await.unwrap();

        let stored = store.find_by_guid(saved.guid()).await.unwrap();
        assert_eq!(stored.username.as_deref(), Some("b"));
        assert_eq!(stored.password_field.as_deref(), Some("pass"));
        // Same password: not a significant change
        assert_eq!(stored.time_password_changed(), 1_000);
        assert_eq!(stored.time_last_modified(), 3_000);

        edited.password = "p2".to_string();
        clock.set(4_000);
        svc.edit_login(saved.guid(), &edited).await.unwrap();
        let stored = store.find_by_guid(saved.guid()).await.unwrap();
        assert_eq!(stored.password, "p2");
        assert_eq!(stored.time_password_changed(), 4_000);
    }

    #[tokio::test]
    async fn edit_unknown_login_fails() {
        let (svc, _, _) = create_test_login_service();
        let edited = Login::for_url("https://example.com", None, "p").unwrap();
        let result = svc.edit_login("ghost", &edited).await;
        assert_eq!(result, Err(LoginsError::NotFound("ghost".to_string())));
    }

    #[tokio::test]
    async fn logins_for_url_uses_host() {
        let (svc, _, _) = create_test_login_service();
        svc.save_login("https://example.com", Some("a".to_string()), "p")
            .await
            .unwrap();
        svc.save_login("https://other.org", Some("a".to_string()), "p")
            .await
            .unwrap();

        let found = svc
            .logins_for_url("https://example.com/account/settings")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].protection_space.host, "example.com");
    }

    #[tokio::test]
    async fn use_login_returns_usage() {
        let (svc, _, clock) = create_test_login_service();
        let saved = svc
            .save_login("https://example.com", Some("a".to_string()), "p")
            .await
            .unwrap();

        clock.set(9_000);
        let usage = svc.use_login(saved.guid()).await.unwrap();
        assert_eq!(usage.times_used, 1);
        assert_eq!(usage.time_last_used, 9_000);
    }

    #[tokio::test]
    async fn use_unknown_login_fails() {
        let (svc, _, _) = create_test_login_service();
        let result = svc.use_login("ghost").await;
        assert!(matches!(result, Err(LoginsError::NotYetCached(_))));
    }

    #[tokio::test]
    async fn delete_logins_partial() {
        let (svc, store, _) = create_test_login_service();
        let saved = svc
            .save_login("https://example.com", Some("a".to_string()), "p")
            .await
            .unwrap();

        let result = svc
            .delete_logins(&[saved.guid().to_string(), "ghost".to_string()])
            .await
            .unwrap();

        assert_eq!(result.success_count, 1);
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.failures[0].guid, "ghost");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_login_missing_fails() {
        let (svc, _, _) = create_test_login_service();
        let result = svc.delete_login("ghost").await;
        assert_eq!(result, Err(LoginsError::NotStored("ghost".to_string())));
    }

    #[tokio::test]
    async fn delete_all_keeps_tombstones_for_synced() {
        let (svc, store, _) = create_test_login_service();
        let saved = svc
            .save_login("https://example.com", Some("a".to_string()), "p")
            .await
            .unwrap();
        store
            .mark_synchronized(&[saved.guid().to_string()], 1)
            .await
            .unwrap();

        svc.delete_all_logins().await.unwrap();

        assert!(svc.list_logins().await.unwrap().is_empty());
        assert_eq!(
            store.pending_upload_deletions().await.unwrap(),
            vec![saved.guid().to_string()]
        );
    }

    #[tokio::test]
    async fn search_passthrough() {
        let (svc, _, _) = create_test_login_service();
        svc.save_login("https://example.com", Some("alice".to_string()), "p")
            .await
            .unwrap();

        assert_eq!(svc.search(Some("lic")).await.unwrap().len(), 1);
        assert!(svc.search(None).await.unwrap().is_empty());
        let found = svc.search(Some("alice")).await.unwrap();
        let fetched = svc.get_login(found[0].guid()).await.unwrap();
        assert_eq!(fetched, found[0]);
    }
}
