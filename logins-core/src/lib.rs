//! Browser Logins Core Library
//!
//! Saved-login storage for the browser, including:
//! - The store contract (`LoginStore`) and its sync bookkeeping (`SyncableLoginStore`)
//! - An in-memory reference store (`MemoryLoginStore`)
//! - Services for saving/filling logins and for upload rounds
//!
//! This library is platform-independent; persistent stores and sync
//! transports are injected by the embedding application through traits.

pub mod error;
pub mod files;
pub mod services;
pub mod store;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{LoginsError, LoginsResult};
pub use files::FileAccessor;
pub use services::{LoginService, LoginSyncService, LoginsContext, SaveOutcome, SyncConfig};
pub use store::MemoryLoginStore;
pub use traits::{Clock, LoginStore, LoginUploader, SyncableLoginStore, SystemClock};
pub use types::{Guid, Login, LoginUpdate, LoginUsageData, ProtectionSpace, Timestamp};
