//! Database models mapping to the wiki schema.

use expunge_core::{Namespace, PageKey, PageTitle};
use serde::Serialize;
use sqlx::FromRow;

// =============================================================================
// Pages
// =============================================================================

/// Primary page record.
#[derive(Debug, Clone, FromRow)]
pub struct PageRow {
    pub page_id: i64,
    pub page_namespace: i32,
    pub page_title: String,
    pub page_is_redirect: bool,
    pub page_latest: i64,
}

impl PageRow {
    pub fn namespace(&self) -> Namespace {
        Namespace::new(self.page_namespace)
    }

    /// Namespace + title key. Fails for rows with an empty or malformed title.
    pub fn key(&self) -> expunge_core::Result<PageKey> {
        Ok(PageKey::new(
            self.namespace(),
            PageTitle::new(&self.page_title)?,
        ))
    }
}

// =============================================================================
// Revision content
// =============================================================================

/// A content unit attached to a revision through a slot.
#[derive(Debug, Clone, FromRow)]
pub struct SlotContentRow {
    pub slot_revision_id: i64,
    pub slot_role_id: i64,
    pub content_id: i64,
    pub content_address: String,
}

impl SlotContentRow {
    /// Text row id for `tt:<id>` addresses; `None` for external addresses.
    pub fn text_id(&self) -> Option<i64> {
        parse_text_address(&self.content_address)
    }
}

/// Parse a `tt:<id>` content address.
pub fn parse_text_address(address: &str) -> Option<i64> {
    address
        .strip_prefix("tt:")
        .and_then(|id| id.parse::<i64>().ok())
        .filter(|id| *id > 0)
}

// =============================================================================
// Files
// =============================================================================

/// Current version of an uploaded file.
#[derive(Debug, Clone, FromRow)]
pub struct ImageRow {
    pub img_name: String,
    pub img_size: i64,
    pub img_sha1: String,
    pub img_timestamp: String,
}

/// Superseded version of an uploaded file.
#[derive(Debug, Clone, FromRow)]
pub struct OldImageRow {
    pub oi_name: String,
    pub oi_archive_name: String,
    pub oi_size: i64,
    pub oi_timestamp: String,
}

/// Deleted (soft-deleted) file version kept in the deleted zone.
#[derive(Debug, Clone, FromRow)]
pub struct FileArchiveRow {
    pub fa_id: i64,
    pub fa_name: String,
    pub fa_storage_key: Option<String>,
}

/// Every file row associated with a file page name.
#[derive(Debug, Clone, Default)]
pub struct FileArtifactRows {
    pub current: Option<ImageRow>,
    pub archived: Vec<OldImageRow>,
    pub deleted: Vec<FileArchiveRow>,
}

impl FileArtifactRows {
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.archived.is_empty() && self.deleted.is_empty()
    }
}

// =============================================================================
// Categories
// =============================================================================

/// Category aggregate record.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub cat_id: i64,
    pub cat_title: String,
    pub cat_pages: i64,
    pub cat_subcats: i64,
    pub cat_files: i64,
}

impl CategoryRow {
    pub fn counts(&self) -> CategoryCounts {
        CategoryCounts {
            pages: self.cat_pages.max(0) as u64,
            subcats: self.cat_subcats.max(0) as u64,
            files: self.cat_files.max(0) as u64,
        }
    }
}

/// Member counts of a category, split by member type.
///
/// `pages` counts every member, as the wiki does; `subcats` and `files`
/// are the subsets that are category pages and file pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub pages: u64,
    pub subcats: u64,
    pub files: u64,
}
