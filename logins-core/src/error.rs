//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Login store error type
///
/// Every store operation reports failure through this type; a failed
/// mutation leaves the store unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum LoginsError {
    /// A structurally equal login (or the same guid) is already stored
    #[error("Login already exists: {0}")]
    AlreadyExists(String),

    /// Guid lookup found nothing
    #[error("Login not found: {0}")]
    NotFound(String),

    /// Update or use tracking referenced a login that was never added
    #[error("Login wasn't cached yet, can't update: {0}")]
    NotYetCached(String),

    /// Removal referenced a guid that isn't stored
    #[error("Can't remove a login that wasn't stored: {0}")]
    NotStored(String),

    /// A URL or site descriptor could not be turned into a protection space
    #[error("Invalid protection space: {0}")]
    InvalidProtectionSpace(String),

    /// Uploading local changes to the sync target failed
    #[error("Sync error: {0}")]
    Sync(String),

    /// Settings could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Backing storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LoginsError {
    /// Whether the error is an expected outcome (duplicate save, unknown guid, bad input),
    /// used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::AlreadyExists(_)
            | Self::NotFound(_)
            | Self::NotYetCached(_)
            | Self::NotStored(_)
            | Self::InvalidProtectionSpace(_)
            | Self::Config(_) => true,
            Self::Sync(_) | Self::Storage(_) => false,
        }
    }
}

/// Login store Result type alias
pub type LoginsResult<T> = std::result::Result<T, LoginsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failures_are_expected() {
        assert!(LoginsError::NotFound("abc".to_string()).is_expected());
        assert!(LoginsError::AlreadyExists("abc".to_string()).is_expected());
        assert!(LoginsError::NotStored("abc".to_string()).is_expected());
    }

    #[test]
    fn infrastructure_failures_are_not_expected() {
        assert!(!LoginsError::Sync("timeout".to_string()).is_expected());
        assert!(!LoginsError::Storage("disk full".to_string()).is_expected());
    }

    #[test]
    fn serializes_with_code_and_details() {
        let json = serde_json::to_value(LoginsError::NotStored("guid-1".to_string())).unwrap();
        assert_eq!(json["code"], "NotStored");
        assert_eq!(json["details"], "guid-1");
    }
}
