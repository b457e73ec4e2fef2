//! Page repository.

use crate::error::MetadataResult;
use crate::models::PageRow;
use async_trait::async_trait;
use expunge_core::PageKey;

/// Read access to pages outside of a purge.
#[async_trait]
pub trait PageRepo: Send + Sync {
    /// Get a page by its numeric id.
    async fn get_page_by_id(&self, page_id: i64) -> MetadataResult<Option<PageRow>>;

    /// Get a page by namespace and title.
    async fn get_page_by_key(&self, key: &PageKey) -> MetadataResult<Option<PageRow>>;

    /// Names of the categories the page is a member of.
    async fn get_page_categories(&self, page_id: i64) -> MetadataResult<Vec<String>>;

    /// Number of live revisions of the page.
    async fn count_revisions(&self, page_id: i64) -> MetadataResult<u64>;
}
