//! Saved login type definitions

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::{LoginsError, LoginsResult};
use crate::utils::timestamp::{self, Timestamp};

/// Opaque globally unique login identifier
pub type Guid = String;

/// Site descriptor a login belongs to (host, port, realm, scheme)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionSpace {
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// HTTP authentication realm, absent for form logins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
}

impl ProtectionSpace {
    /// Create a protection space without a realm
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, protocol: Option<String>) -> Self {
        Self {
            host: host.into(),
            port,
            protocol,
            realm: None,
        }
    }

    /// Attach an authentication realm
    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Parse a site URL into a protection space.
    ///
    /// The port falls back to the scheme's well-known port, or 0 when the
    /// scheme has none.
    pub fn from_url(raw: &str) -> LoginsResult<Self> {
        let url = Url::parse(raw)
            .map_err(|e| LoginsError::InvalidProtectionSpace(format!("{raw}: {e}")))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| LoginsError::InvalidProtectionSpace(format!("{raw}: missing host")))?;

        Ok(Self {
            host: host.to_string(),
            port: url.port_or_known_default().unwrap_or(0),
            protocol: Some(url.scheme().to_string()),
            realm: None,
        })
    }

    /// Display origin for this space, e.g. `https://example.com`
    #[must_use]
    pub fn origin(&self) -> String {
        let scheme = self.protocol.as_deref().unwrap_or("https");
        let default_port = match scheme {
            "http" => Some(80),
            "https" => Some(443),
            _ => None,
        };
        if self.port == 0 || default_port == Some(self.port) {
            format!("{scheme}://{}", self.host)
        } else {
            format!("{scheme}://{}:{}", self.host, self.port)
        }
    }
}

/// A stored login.
///
/// Equality is structural: two logins are equal when they share a protection
/// space, username and password. The guid and usage metadata don't take part,
/// which is how the store detects duplicates on insert and finds the record a
/// caller-built login refers to on update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    guid: Guid,
    /// Human-facing host string, used for sorting and free-text search
    pub hostname: String,
    pub protection_space: ProtectionSpace,
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_submit_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_field: Option<String>,
    #[serde(default, with = "crate::utils::timestamp")]
    time_created: Timestamp,
    #[serde(default, with = "crate::utils::timestamp")]
    time_last_used: Timestamp,
    #[serde(default, with = "crate::utils::timestamp")]
    time_password_changed: Timestamp,
    #[serde(default, with = "crate::utils::timestamp")]
    time_last_modified: Timestamp,
    #[serde(default)]
    times_used: u64,
}

impl PartialEq for Login {
    fn eq(&self, other: &Self) -> bool {
        self.protection_space == other.protection_space
            && self.username == other.username
            && self.password == other.password
    }
}

impl Eq for Login {}

impl Login {
    /// Create a new login with a fresh guid and zeroed usage metadata
    #[must_use]
    pub fn new(
        hostname: impl Into<String>,
        protection_space: ProtectionSpace,
        username: Option<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::with_guid(
            Uuid::new_v4().to_string(),
            hostname,
            protection_space,
            username,
            password,
        )
    }

    /// Create a login carrying a guid assigned elsewhere (e.g. by a sync server)
    #[must_use]
    pub fn with_guid(
        guid: impl Into<Guid>,
        hostname: impl Into<String>,
        protection_space: ProtectionSpace,
        username: Option<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            guid: guid.into(),
            hostname: hostname.into(),
            protection_space,
            username,
            password: password.into(),
            form_submit_url: None,
            username_field: None,
            password_field: None,
            time_created: 0,
            time_last_used: 0,
            time_password_changed: 0,
            time_last_modified: 0,
            times_used: 0,
        }
    }

    /// Create a login for a site URL; the hostname is the URL's origin
    pub fn for_url(
        url: &str,
        username: Option<String>,
        password: impl Into<String>,
    ) -> LoginsResult<Self> {
        let space = ProtectionSpace::from_url(url)?;
        Ok(Self::new(space.origin(), space, username, password))
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn time_created(&self) -> Timestamp {
        self.time_created
    }

    pub fn time_last_used(&self) -> Timestamp {
        self.time_last_used
    }

    pub fn time_password_changed(&self) -> Timestamp {
        self.time_password_changed
    }

    pub fn time_last_modified(&self) -> Timestamp {
        self.time_last_modified
    }

    pub fn times_used(&self) -> u64 {
        self.times_used
    }

    /// Usage metadata projection
    #[must_use]
    pub fn usage_data(&self) -> LoginUsageData {
        LoginUsageData {
            guid: self.guid.clone(),
            times_used: self.times_used,
            time_created: self.time_created,
            time_last_used: self.time_last_used,
            time_password_changed: self.time_password_changed,
        }
    }

    /// Whether `query` occurs in the username, password or hostname
    pub(crate) fn matches_query(&self, query: &str) -> bool {
        self.username.as_deref().is_some_and(|u| u.contains(query))
            || self.password.contains(query)
            || self.hostname.contains(query)
    }

    /// Fresh usage metadata for a login entering the store; caller-supplied values are discarded
    pub(crate) fn stamp_inserted(&mut self, now: Timestamp) {
        self.time_created = now;
        self.time_password_changed = now;
        self.time_last_modified = now;
        self.time_last_used = 0;
        self.times_used = 0;
    }

    pub(crate) fn touch_used(&mut self, now: Timestamp) {
        self.time_last_used = timestamp::advance(self.time_last_used, now);
        self.times_used = self.times_used.saturating_add(1);
    }

    pub(crate) fn touch_password_changed(&mut self, now: Timestamp) {
        self.time_password_changed = timestamp::advance(self.time_password_changed, now);
    }

    pub(crate) fn touch_modified(&mut self, now: Timestamp) {
        self.time_last_modified = timestamp::advance(self.time_last_modified, now);
    }
}

/// Usage metadata of a login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUsageData {
    pub guid: Guid,
    pub times_used: u64,
    pub time_created: Timestamp,
    pub time_last_used: Timestamp,
    pub time_password_changed: Timestamp,
}

/// Partial replacement of a stored login's mutable fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protection_space: Option<ProtectionSpace>,

    /// `Some(None)` clears the username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_submit_url: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username_field: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_field: Option<Option<String>>,
}

impl LoginUpdate {
    /// Replace every mutable field with the values of `login`
    #[must_use]
    pub fn from_login(login: &Login) -> Self {
        Self {
            hostname: Some(login.hostname.clone()),
            protection_space: Some(login.protection_space.clone()),
            username: Some(login.username.clone()),
            password: Some(login.password.clone()),
            form_submit_url: Some(login.form_submit_url.clone()),
            username_field: Some(login.username_field.clone()),
            password_field: Some(login.password_field.clone()),
        }
    }

    /// Apply the update to an existing login. Usage metadata is left to the caller.
    pub fn apply_to(&self, login: &mut Login) {
        if let Some(ref hostname) = self.hostname {
            login.hostname.clone_from(hostname);
        }
        if let Some(ref space) = self.protection_space {
            login.protection_space.clone_from(space);
        }
        if let Some(ref username) = self.username {
            login.username.clone_from(username);
        }
        if let Some(ref password) = self.password {
            login.password.clone_from(password);
        }
        if let Some(ref url) = self.form_submit_url {
            login.form_submit_url.clone_from(url);
        }
        if let Some(ref field) = self.username_field {
            login.username_field.clone_from(field);
        }
        if let Some(ref field) = self.password_field {
            login.password_field.clone_from(field);
        }
    }
}
