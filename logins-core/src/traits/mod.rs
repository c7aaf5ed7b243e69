//! Storage layer abstraction trait definition

mod clock;
mod login_store;
mod login_uploader;
mod syncable_login_store;

pub use clock::{Clock, SystemClock};
pub use login_store::LoginStore;
pub use login_uploader::LoginUploader;
pub use syncable_login_store::SyncableLoginStore;
