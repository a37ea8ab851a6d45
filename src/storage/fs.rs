use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::Storage;
use crate::error::StorageError;
use crate::models::ProductFolder;

/// Filesystem-backed storage rooted at one output directory.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    root: PathBuf,
}

impl StorageRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Create the root directory itself.
    pub async fn ensure(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::Io {
                path: self.root.clone(),
                source,
            })
    }
}

#[async_trait]
impl Storage for StorageRoot {
    async fn create_folder(&self, folder: &ProductFolder) -> Result<(), StorageError> {
        let path = self.root.join(folder.name());
        fs::create_dir_all(&path)
            .await
            .map_err(|source| StorageError::Io { path, source })
    }

    async fn write_bytes(&self, relative: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(relative);
        fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Io { path, source })
    }
}
