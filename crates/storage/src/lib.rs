//! Binary artifact storage for expunge.
//!
//! This crate provides:
//! - The `ArtifactStore` abstraction over uploaded files and derivatives
//! - A local filesystem backend with path-traversal protection
//! - The hashed upload-directory layout used to locate a file's artifacts

pub mod backends;
pub mod error;
pub mod layout;
pub mod traits;

pub use backends::filesystem::FilesystemBackend;
pub use error::{StorageError, StorageResult};
pub use layout::FileLayout;
pub use traits::ArtifactStore;

use expunge_core::config::StorageConfig;
use std::sync::Arc;

/// Create an artifact store and its layout from configuration.
pub async fn from_config(
    config: &StorageConfig,
) -> StorageResult<(Arc<dyn ArtifactStore>, FileLayout)> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem { path, hash_levels } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok((Arc::new(backend), FileLayout::new(*hash_levels)))
        }
    }
}
