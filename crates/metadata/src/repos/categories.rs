//! Category aggregate repository.

use crate::error::MetadataResult;
use crate::models::{CategoryCounts, CategoryRow};
use async_trait::async_trait;

/// Repository for category aggregates.
#[async_trait]
pub trait CategoryRepo: Send + Sync {
    /// Get a category aggregate by category name.
    async fn get_category(&self, name: &str) -> MetadataResult<Option<CategoryRow>>;

    /// Recompute a category's member counts from `categorylinks`.
    ///
    /// Returns `None` when no aggregate row exists for the name; nothing is
    /// written in that case. Recomputing is idempotent: the counts depend
    /// only on the current membership rows.
    async fn refresh_category_counts(&self, name: &str) -> MetadataResult<Option<CategoryCounts>>;
}
