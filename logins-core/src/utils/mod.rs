//! Utility modules.

/// Log sanitization utilities to keep login data out of logs.
pub mod log_sanitizer;

/// Microsecond timestamp helpers for login usage metadata.
pub mod timestamp;
