//! Purge unit of work.
//!
//! A [`PurgeTransaction`] wraps one database transaction. Every statement of
//! a purge cascade runs through it, so either all deletions commit together
//! or none of them do. Dropping a transaction without committing rolls it back.

use crate::error::MetadataResult;
use crate::models::{FileArtifactRows, PageRow, SlotContentRow};
use async_trait::async_trait;
use expunge_core::Namespace;

/// Tables whose rows reference a page by its numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageIdRelation {
    Redirect,
    ExternalLinks,
    LangLinks,
    SearchIndex,
    Restrictions,
    PageLinks,
    CategoryLinks,
    TemplateLinks,
    ImageLinks,
    Revision,
    Page,
}

impl PageIdRelation {
    /// Relations in direct relation with the page, removed before revision
    /// content. They have no dependencies among each other.
    pub const DIRECT: [Self; 8] = [
        Self::Redirect,
        Self::ExternalLinks,
        Self::LangLinks,
        Self::SearchIndex,
        Self::Restrictions,
        Self::PageLinks,
        Self::CategoryLinks,
        Self::TemplateLinks,
    ];

    pub const fn table(self) -> &'static str {
        match self {
            Self::Redirect => "redirect",
            Self::ExternalLinks => "externallinks",
            Self::LangLinks => "langlinks",
            Self::SearchIndex => "searchindex",
            Self::Restrictions => "page_restrictions",
            Self::PageLinks => "pagelinks",
            Self::CategoryLinks => "categorylinks",
            Self::TemplateLinks => "templatelinks",
            Self::ImageLinks => "imagelinks",
            Self::Revision => "revision",
            Self::Page => "page",
        }
    }

    pub const fn column(self) -> &'static str {
        match self {
            Self::Redirect => "rd_from",
            Self::ExternalLinks => "el_from",
            Self::LangLinks => "ll_from",
            Self::SearchIndex => "si_page",
            Self::Restrictions => "pr_page",
            Self::PageLinks => "pl_from",
            Self::CategoryLinks => "cl_from",
            Self::TemplateLinks => "tl_from",
            Self::ImageLinks => "il_from",
            Self::Revision => "rev_page",
            Self::Page => "page_id",
        }
    }
}

/// Tables whose rows reference a page by namespace and title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TitleRelation {
    RecentChanges,
    Archive,
    Logging,
    Watchlist,
}

impl TitleRelation {
    pub const fn table(self) -> &'static str {
        match self {
            Self::RecentChanges => "recentchanges",
            Self::Archive => "archive",
            Self::Logging => "logging",
            Self::Watchlist => "watchlist",
        }
    }

    pub const fn namespace_column(self) -> &'static str {
        match self {
            Self::RecentChanges => "rc_namespace",
            Self::Archive => "ar_namespace",
            Self::Logging => "log_namespace",
            Self::Watchlist => "wl_namespace",
        }
    }

    pub const fn title_column(self) -> &'static str {
        match self {
            Self::RecentChanges => "rc_title",
            Self::Archive => "ar_title",
            Self::Logging => "log_title",
            Self::Watchlist => "wl_title",
        }
    }
}

/// Statements available to a purge, all bound to one open transaction.
#[async_trait]
pub trait PurgeTransaction: Send {
    /// Re-read the page row under the transaction. PostgreSQL also takes a
    /// row lock so concurrent purges of the same page serialize here.
    async fn lock_page(&mut self, page_id: i64) -> MetadataResult<Option<PageRow>>;

    /// Category names the page belongs to.
    async fn page_categories(&mut self, page_id: i64) -> MetadataResult<Vec<String>>;

    /// Delete every row of `relation` that references the page id.
    async fn delete_by_page_id(
        &mut self,
        relation: PageIdRelation,
        page_id: i64,
    ) -> MetadataResult<u64>;

    /// Delete every row of `relation` for the namespace and title.
    async fn delete_by_title(
        &mut self,
        relation: TitleRelation,
        namespace: Namespace,
        title: &str,
    ) -> MetadataResult<u64>;

    // ----- legacy content layout -----

    /// Text ids of the page's live revisions.
    async fn legacy_text_ids_for_page(&mut self, page_id: i64) -> MetadataResult<Vec<i64>>;

    /// Text ids of archived revisions with the namespace and title.
    async fn legacy_archived_text_ids(
        &mut self,
        namespace: Namespace,
        title: &str,
    ) -> MetadataResult<Vec<i64>>;

    /// Delete a text blob row. Returns the number of rows removed.
    async fn delete_text(&mut self, text_id: i64) -> MetadataResult<u64>;

    // ----- multi-unit content layout -----

    /// Ids of the page's live revisions.
    async fn revision_ids_for_page(&mut self, page_id: i64) -> MetadataResult<Vec<i64>>;

    /// Revision ids of archived revisions with the namespace and title.
    async fn archived_revision_ids(
        &mut self,
        namespace: Namespace,
        title: &str,
    ) -> MetadataResult<Vec<i64>>;

    /// Content units attached to a revision.
    async fn content_units_for_revision(
        &mut self,
        revision_id: i64,
    ) -> MetadataResult<Vec<SlotContentRow>>;

    /// Number of slots referencing the content unit from revisions other
    /// than `owning_revision_id`. PostgreSQL locks the content row first so
    /// no new reference can be added until the transaction ends.
    async fn count_other_references(
        &mut self,
        content_id: i64,
        owning_revision_id: i64,
    ) -> MetadataResult<u64>;

    /// Delete a content unit row.
    async fn delete_content(&mut self, content_id: i64) -> MetadataResult<u64>;

    /// Delete a revision's slot assignment.
    async fn delete_slot(&mut self, revision_id: i64, role_id: i64) -> MetadataResult<u64>;

    // ----- files -----

    /// Current, superseded, and deleted-zone file rows for a file name.
    async fn file_artifacts(&mut self, name: &str) -> MetadataResult<FileArtifactRows>;

    /// Delete the `filearchive`, `oldimage`, and `image` rows for a file name.
    async fn delete_file_rows(&mut self, name: &str) -> MetadataResult<u64>;

    // ----- completion -----

    async fn commit(self: Box<Self>) -> MetadataResult<()>;

    async fn rollback(self: Box<Self>) -> MetadataResult<()>;
}

/// Repository that opens purge transactions.
#[async_trait]
pub trait PurgeRepo: Send + Sync {
    /// Begin a purge unit of work.
    async fn begin_purge(&self) -> MetadataResult<Box<dyn PurgeTransaction>>;
}
