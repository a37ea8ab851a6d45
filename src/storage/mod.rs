use async_trait::async_trait;
use std::path::Path;

use crate::error::StorageError;
use crate::models::{ProductFolder, ProductRecord, RECORD_FILE};

mod csv_record;
mod fs;
pub use csv_record::encode_record;
pub use fs::StorageRoot;

/// Durable per-product namespaces holding downloaded assets and records.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_folder(&self, folder: &ProductFolder) -> Result<(), StorageError>;

    /// Write `bytes` at a root-relative path, replacing any existing file.
    async fn write_bytes(&self, relative: &Path, bytes: &[u8]) -> Result<(), StorageError>;

    async fn write_record(&self, record: &ProductRecord) -> Result<(), StorageError> {
        let encoded = encode_record(record)?;
        self.write_bytes(&record.folder.file(RECORD_FILE), &encoded).await
    }
}
