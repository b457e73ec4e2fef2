//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Binary artifact store for uploaded files and their derivatives.
///
/// Keys are `/`-separated relative paths below the store root.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Check if an artifact exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Store an artifact, replacing any existing one atomically.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Delete an artifact. Returns `StorageError::NotFound` if it is absent.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Recursively delete everything under a prefix.
    ///
    /// Returns the number of artifacts removed; a missing prefix removes nothing.
    async fn delete_prefix(&self, prefix: &str) -> StorageResult<u64>;

    /// List artifact keys under a prefix.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Get the backend name for logging.
    fn backend_name(&self) -> &'static str;

    /// Verify the backend is reachable and properly configured.
    ///
    /// The default implementation returns Ok(()).
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
