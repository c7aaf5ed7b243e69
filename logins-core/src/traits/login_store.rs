//! Saved-login storage abstract Trait

use async_trait::async_trait;

use crate::error::LoginsResult;
use crate::types::{BatchRemoveResult, Guid, Login, LoginUpdate, LoginUsageData, ProtectionSpace};

/// Saved-login store Trait
///
/// Implementations:
/// - `MemoryLoginStore` (in-process reference store, also used in tests)
/// - A database-backed store is provided by the embedding platform
///
/// Queries may run concurrently with each other; mutations are serialized
/// against every other operation. Returned logins are copies.
#[async_trait]
pub trait LoginStore: Send + Sync {
    // === Queries ===

    /// Logins whose protection space host matches, most recently used first
    ///
    /// # Arguments
    /// * `space` - Site descriptor; only the host takes part in matching
    async fn find_by_protection_space(&self, space: &ProtectionSpace) -> LoginsResult<Vec<Login>>;

    /// Like `find_by_protection_space`, additionally requiring an exact username match
    ///
    /// `None` matches only logins stored without a username.
    async fn find_by_protection_space_and_username(
        &self,
        space: &ProtectionSpace,
        username: Option<&str>,
    ) -> LoginsResult<Vec<Login>>;

    /// Exact guid lookup
    ///
    /// # Returns
    /// * `Err(LoginsError::NotFound)` - No login has this guid
    async fn find_by_guid(&self, guid: &str) -> LoginsResult<Login>;

    /// Every login, hostname descending
    async fn find_all(&self) -> LoginsResult<Vec<Login>>;

    /// Free-text search over username, password and hostname, hostname descending
    ///
    /// An absent or empty query matches nothing.
    async fn search(&self, query: Option<&str>) -> LoginsResult<Vec<Login>>;

    /// Free-text search with a present query
    async fn find_by_query(&self, query: &str) -> LoginsResult<Vec<Login>> {
        self.search(Some(query)).await
    }

    /// Usage metadata of the most recently used login with this guid
    ///
    /// # Returns
    /// * `Err(LoginsError::NotFound)` - No login has this guid
    async fn usage_data_for_guid(&self, guid: &str) -> LoginsResult<LoginUsageData>;

    // === Mutations ===

    /// Insert a login
    ///
    /// # Returns
    /// * `Err(LoginsError::AlreadyExists)` - A structurally equal login, or one with the same guid, is stored
    async fn add(&self, login: &Login) -> LoginsResult<()>;

    /// Replace the mutable fields of the login with this guid
    ///
    /// # Arguments
    /// * `guid` - Login to update
    /// * `update` - Replacement fields
    /// * `significant` - Whether the change counts as a password change
    async fn update_by_guid(
        &self,
        guid: &str,
        update: &LoginUpdate,
        significant: bool,
    ) -> LoginsResult<()>;

    /// Record a password change for the stored login structurally equal to `login`
    ///
    /// # Returns
    /// * `Err(LoginsError::NotYetCached)` - The login was never added
    async fn update(&self, login: &Login) -> LoginsResult<()>;

    /// Record a use of the login with this guid
    ///
    /// # Returns
    /// * `Err(LoginsError::NotYetCached)` - No login has this guid
    async fn record_use(&self, guid: &str) -> LoginsResult<()>;

    /// Remove a login
    ///
    /// # Returns
    /// * `Err(LoginsError::NotStored)` - No login has this guid
    async fn remove(&self, guid: &str) -> LoginsResult<()>;

    /// Remove several logins, best effort
    ///
    /// Every guid is attempted; unknown guids are reported in the result
    /// instead of failing the call.
    async fn remove_batch(&self, guids: &[Guid]) -> LoginsResult<BatchRemoveResult>;

    /// Remove every login
    async fn remove_all(&self) -> LoginsResult<()>;
}
