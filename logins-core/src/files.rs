//! Storage location handle passed to store constructors

use std::path::{Path, PathBuf};

use crate::error::{LoginsError, LoginsResult};

/// Root directory a persistent login store keeps its files under.
///
/// The in-memory store accepts one for signature parity and ignores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAccessor {
    root: PathBuf,
}

impl FileAccessor {
    /// Create an accessor rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Accessor rooted at the platform data directory, e.g. `~/.local/share/<app_name>`
    pub fn default_location(app_name: &str) -> LoginsResult<Self> {
        dirs::data_dir()
            .map(|dir| Self::new(dir.join(app_name)))
            .ok_or_else(|| {
                LoginsError::Storage("Could not determine platform data directory".to_string())
            })
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Path of a file inside the root
    #[must_use]
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }
}
