//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{CategoryRepo, PageRepo, PurgeRepo, SchemaRepo};
use async_trait::async_trait;
use expunge_core::config::{BootstrapLayout, SchemaBootstrap};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: PageRepo + CategoryRepo + SchemaRepo + PurgeRepo + Send + Sync {
    /// Create the schema on an empty database. Existing schemas are left untouched.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// Columns selected for [`crate::models::PageRow`].
pub(crate) const PAGE_COLUMNS: &str =
    "page_id, page_namespace, page_title, page_is_redirect, page_latest";

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    bootstrap: SchemaBootstrap,
}

impl SqliteStore {
    /// Open (or create) a SQLite database.
    pub async fn new(
        path: impl AsRef<Path>,
        query_timeout_secs: Option<u64>,
        bootstrap: SchemaBootstrap,
    ) -> MetadataResult<Self> {
        let path = path.as_ref();
        let query_timeout_secs = query_timeout_secs.unwrap_or(600);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // A single connection makes SQLite the exclusive writer: a purge
            // holds it for the whole cascade and concurrent purges queue on
            // the pool instead of failing with "database is locked".
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool, bootstrap };
        store.migrate().await?;

        tracing::warn!(
            query_timeout_secs = query_timeout_secs,
            "SQLite query timeout is advisory only - SQLite cannot cancel running statements. \
             Use PostgreSQL when purges must be bounded by a statement timeout."
        );

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn table_exists(&self, table: &str) -> MetadataResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn column_exists(&self, table: &str, column: &str) -> MetadataResult<bool> {
        // PRAGMA arguments cannot be bound; callers pass static table names.
        let columns: Vec<(i32, String, String, i32, Option<String>, i32)> =
            sqlx::query_as(&format!("PRAGMA table_info({table})"))
                .fetch_all(&self.pool)
                .await?;
        Ok(columns.iter().any(|(_, name, _, _, _, _)| name == column))
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        if self.table_exists("page").await? {
            tracing::debug!("Existing wiki schema found, skipping bootstrap");
            return Ok(());
        }

        tracing::info!(
            layout = ?self.bootstrap.layout,
            search_index = self.bootstrap.search_index,
            "Bootstrapping wiki schema"
        );
        let schema = sqlite_schema(&self.bootstrap);
        sqlx::query(&schema).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Assemble the bootstrap schema for the requested layout.
pub(crate) fn sqlite_schema(bootstrap: &SchemaBootstrap) -> String {
    let mut schema = String::from(SCHEMA_SQL);
    schema.push_str(match bootstrap.layout {
        BootstrapLayout::Legacy => LEGACY_REVISION_SQL,
        BootstrapLayout::Slots => SLOTS_REVISION_SQL,
    });
    if bootstrap.search_index {
        schema.push_str(SEARCH_INDEX_SQL);
    }
    schema
}

mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use crate::repos::schema::{ContentLayout, SchemaCapabilities};
    use crate::repos::{PageIdRelation, PurgeTransaction, TitleRelation};
    use expunge_core::{Namespace, PageKey};
    use sqlx::Transaction;

    #[async_trait]
    impl PageRepo for SqliteStore {
        async fn get_page_by_id(&self, page_id: i64) -> MetadataResult<Option<PageRow>> {
            let row = sqlx::query_as::<_, PageRow>(&format!(
                "SELECT {PAGE_COLUMNS} FROM page WHERE page_id = ?"
            ))
            .bind(page_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn get_page_by_key(&self, key: &PageKey) -> MetadataResult<Option<PageRow>> {
            let row = sqlx::query_as::<_, PageRow>(&format!(
                "SELECT {PAGE_COLUMNS} FROM page WHERE page_namespace = ? AND page_title = ?"
            ))
            .bind(key.namespace.id())
            .bind(key.title.as_str())
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn get_page_categories(&self, page_id: i64) -> MetadataResult<Vec<String>> {
            let names = sqlx::query_scalar(
                "SELECT cl_to FROM categorylinks WHERE cl_from = ? ORDER BY cl_to",
            )
            .bind(page_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(names)
        }

        async fn count_revisions(&self, page_id: i64) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revision WHERE rev_page = ?")
                .bind(page_id)
                .fetch_one(&self.pool)
                .await?;
            Ok(count as u64)
        }
    }

    #[async_trait]
    impl CategoryRepo for SqliteStore {
        async fn get_category(&self, name: &str) -> MetadataResult<Option<CategoryRow>> {
            let row = sqlx::query_as::<_, CategoryRow>(
                "SELECT cat_id, cat_title, cat_pages, cat_subcats, cat_files FROM category WHERE cat_title = ?",
            )
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn refresh_category_counts(
            &self,
            name: &str,
        ) -> MetadataResult<Option<CategoryCounts>> {
            let mut tx = self.pool.begin().await?;

            let cat_id: Option<i64> =
                sqlx::query_scalar("SELECT cat_id FROM category WHERE cat_title = ?")
                    .bind(name)
                    .fetch_optional(&mut *tx)
                    .await?;

            let Some(cat_id) = cat_id else {
                tx.rollback().await?;
                return Ok(None);
            };

            let (pages, subcats, files): (i64, i64, i64) = sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN cl_type = 'subcat' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN cl_type = 'file' THEN 1 ELSE 0 END), 0)
                FROM categorylinks
                WHERE cl_to = ?
                "#,
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE category SET cat_pages = ?, cat_subcats = ?, cat_files = ? WHERE cat_id = ?",
            )
            .bind(pages)
            .bind(subcats)
            .bind(files)
            .bind(cat_id)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;

            Ok(Some(CategoryCounts {
                pages: pages as u64,
                subcats: subcats as u64,
                files: files as u64,
            }))
        }
    }

    #[async_trait]
    impl SchemaRepo for SqliteStore {
        async fn probe_capabilities(&self) -> MetadataResult<SchemaCapabilities> {
            if !self.table_exists("page").await? || !self.table_exists("revision").await? {
                return Err(MetadataError::UnsupportedSchema(
                    "page and revision tables are required".to_string(),
                ));
            }
            let has_slots = self.table_exists("slots").await?;
            let has_rev_text_id = self.column_exists("revision", "rev_text_id").await?;

            Ok(SchemaCapabilities {
                content_layout: ContentLayout::detect(has_slots, has_rev_text_id)?,
                search_index: self.table_exists("searchindex").await?,
            })
        }
    }

    #[async_trait]
    impl PurgeRepo for SqliteStore {
        async fn begin_purge(&self) -> MetadataResult<Box<dyn PurgeTransaction>> {
            let tx = self.pool.begin().await?;
            Ok(Box::new(SqlitePurgeTransaction { tx }))
        }
    }

    /// Purge unit of work on a SQLite transaction.
    struct SqlitePurgeTransaction {
        tx: Transaction<'static, Sqlite>,
    }

    #[async_trait]
    impl PurgeTransaction for SqlitePurgeTransaction {
        async fn lock_page(&mut self, page_id: i64) -> MetadataResult<Option<PageRow>> {
            // The pool's single connection already excludes other writers.
            let row = sqlx::query_as::<_, PageRow>(&format!(
                "SELECT {PAGE_COLUMNS} FROM page WHERE page_id = ?"
            ))
            .bind(page_id)
            .fetch_optional(&mut *self.tx)
            .await?;
            Ok(row)
        }

        async fn page_categories(&mut self, page_id: i64) -> MetadataResult<Vec<String>> {
            let names = sqlx::query_scalar(
                "SELECT cl_to FROM categorylinks WHERE cl_from = ? ORDER BY cl_to",
            )
            .bind(page_id)
            .fetch_all(&mut *self.tx)
            .await?;
            Ok(names)
        }

        async fn delete_by_page_id(
            &mut self,
            relation: PageIdRelation,
            page_id: i64,
        ) -> MetadataResult<u64> {
            let result = sqlx::query(&format!(
                "DELETE FROM {} WHERE {} = ?",
                relation.table(),
                relation.column()
            ))
            .bind(page_id)
            .execute(&mut *self.tx)
            .await?;
            Ok(result.rows_affected())
        }

        async fn delete_by_title(
            &mut self,
            relation: TitleRelation,
            namespace: Namespace,
            title: &str,
        ) -> MetadataResult<u64> {
            let result = sqlx::query(&format!(
                "DELETE FROM {} WHERE {} = ? AND {} = ?",
                relation.table(),
                relation.namespace_column(),
                relation.title_column()
            ))
            .bind(namespace.id())
            .bind(title)
            .execute(&mut *self.tx)
            .await?;
            Ok(result.rows_affected())
        }

        async fn legacy_text_ids_for_page(&mut self, page_id: i64) -> MetadataResult<Vec<i64>> {
            let ids = sqlx::query_scalar("SELECT rev_text_id FROM revision WHERE rev_page = ?")
                .bind(page_id)
                .fetch_all(&mut *self.tx)
                .await?;
            Ok(ids)
        }

        async fn legacy_archived_text_ids(
            &mut self,
            namespace: Namespace,
            title: &str,
        ) -> MetadataResult<Vec<i64>> {
            let ids = sqlx::query_scalar(
                "SELECT ar_text_id FROM archive WHERE ar_namespace = ? AND ar_title = ?",
            )
            .bind(namespace.id())
            .bind(title)
            .fetch_all(&mut *self.tx)
            .await?;
            Ok(ids)
        }

        async fn delete_text(&mut self, text_id: i64) -> MetadataResult<u64> {
            let result = sqlx::query("DELETE FROM text WHERE old_id = ?")
                .bind(text_id)
                .execute(&mut *self.tx)
                .await?;
            Ok(result.rows_affected())
        }

        async fn revision_ids_for_page(&mut self, page_id: i64) -> MetadataResult<Vec<i64>> {
            let ids = sqlx::query_scalar(
                "SELECT rev_id FROM revision WHERE rev_page = ? ORDER BY rev_id",
            )
            .bind(page_id)
            .fetch_all(&mut *self.tx)
            .await?;
            Ok(ids)
        }

        async fn archived_revision_ids(
            &mut self,
            namespace: Namespace,
            title: &str,
        ) -> MetadataResult<Vec<i64>> {
            let ids = sqlx::query_scalar(
                "SELECT ar_rev_id FROM archive WHERE ar_namespace = ? AND ar_title = ? ORDER BY ar_rev_id",
            )
            .bind(namespace.id())
            .bind(title)
            .fetch_all(&mut *self.tx)
            .await?;
            Ok(ids)
        }

        async fn content_units_for_revision(
            &mut self,
            revision_id: i64,
        ) -> MetadataResult<Vec<SlotContentRow>> {
            let rows = sqlx::query_as::<_, SlotContentRow>(
                r#"
                SELECT s.slot_revision_id, s.slot_role_id, c.content_id, c.content_address
                FROM slots s
                INNER JOIN content c ON c.content_id = s.slot_content_id
                WHERE s.slot_revision_id = ?
                ORDER BY s.slot_role_id
                "#,
            )
            .bind(revision_id)
            .fetch_all(&mut *self.tx)
            .await?;
            Ok(rows)
        }

        async fn count_other_references(
            &mut self,
            content_id: i64,
            owning_revision_id: i64,
        ) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM slots WHERE slot_content_id = ? AND slot_revision_id <> ?",
            )
            .bind(content_id)
            .bind(owning_revision_id)
            .fetch_one(&mut *self.tx)
            .await?;
            Ok(count as u64)
        }

        async fn delete_content(&mut self, content_id: i64) -> MetadataResult<u64> {
            let result = sqlx::query("DELETE FROM content WHERE content_id = ?")
                .bind(content_id)
                .execute(&mut *self.tx)
                .await?;
            Ok(result.rows_affected())
        }

        async fn delete_slot(&mut self, revision_id: i64, role_id: i64) -> MetadataResult<u64> {
            let result =
                sqlx::query("DELETE FROM slots WHERE slot_revision_id = ? AND slot_role_id = ?")
                    .bind(revision_id)
                    .bind(role_id)
                    .execute(&mut *self.tx)
                    .await?;
            Ok(result.rows_affected())
        }

        async fn file_artifacts(&mut self, name: &str) -> MetadataResult<FileArtifactRows> {
            let current = sqlx::query_as::<_, ImageRow>(
                "SELECT img_name, img_size, img_sha1, img_timestamp FROM image WHERE img_name = ?",
            )
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;

            let archived = sqlx::query_as::<_, OldImageRow>(
                "SELECT oi_name, oi_archive_name, oi_size, oi_timestamp FROM oldimage WHERE oi_name = ? ORDER BY oi_timestamp",
            )
            .bind(name)
            .fetch_all(&mut *self.tx)
            .await?;

            let deleted = sqlx::query_as::<_, FileArchiveRow>(
                "SELECT fa_id, fa_name, fa_storage_key FROM filearchive WHERE fa_name = ? ORDER BY fa_id",
            )
            .bind(name)
            .fetch_all(&mut *self.tx)
            .await?;

            Ok(FileArtifactRows {
                current,
                archived,
                deleted,
            })
        }

        async fn delete_file_rows(&mut self, name: &str) -> MetadataResult<u64> {
            let mut deleted = 0;
            for sql in [
                "DELETE FROM filearchive WHERE fa_name = ?",
                "DELETE FROM oldimage WHERE oi_name = ?",
                "DELETE FROM image WHERE img_name = ?",
            ] {
                deleted += sqlx::query(sql)
                    .bind(name)
                    .execute(&mut *self.tx)
                    .await?
                    .rows_affected();
            }
            Ok(deleted)
        }

        async fn commit(self: Box<Self>) -> MetadataResult<()> {
            self.tx.commit().await?;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> MetadataResult<()> {
            self.tx.rollback().await?;
            Ok(())
        }
    }
}

/// Tables shared by both content layouts.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS page (
    page_id INTEGER PRIMARY KEY,
    page_namespace INTEGER NOT NULL,
    page_title TEXT NOT NULL,
    page_is_redirect INTEGER NOT NULL DEFAULT 0,
    page_latest INTEGER NOT NULL DEFAULT 0,
    page_touched TEXT NOT NULL DEFAULT '',
    UNIQUE (page_namespace, page_title)
);

CREATE TABLE IF NOT EXISTS text (
    old_id INTEGER PRIMARY KEY,
    old_text TEXT NOT NULL,
    old_flags TEXT NOT NULL DEFAULT 'utf-8'
);

CREATE TABLE IF NOT EXISTS redirect (
    rd_from INTEGER PRIMARY KEY,
    rd_namespace INTEGER NOT NULL,
    rd_title TEXT NOT NULL,
    rd_fragment TEXT
);

CREATE TABLE IF NOT EXISTS externallinks (
    el_id INTEGER PRIMARY KEY,
    el_from INTEGER NOT NULL,
    el_to TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_externallinks_from ON externallinks(el_from);

CREATE TABLE IF NOT EXISTS langlinks (
    ll_from INTEGER NOT NULL,
    ll_lang TEXT NOT NULL,
    ll_title TEXT NOT NULL,
    PRIMARY KEY (ll_from, ll_lang)
);

CREATE TABLE IF NOT EXISTS page_restrictions (
    pr_id INTEGER PRIMARY KEY,
    pr_page INTEGER NOT NULL,
    pr_type TEXT NOT NULL,
    pr_level TEXT NOT NULL,
    UNIQUE (pr_page, pr_type)
);

CREATE TABLE IF NOT EXISTS pagelinks (
    pl_from INTEGER NOT NULL,
    pl_namespace INTEGER NOT NULL,
    pl_title TEXT NOT NULL,
    PRIMARY KEY (pl_from, pl_namespace, pl_title)
);
CREATE INDEX IF NOT EXISTS idx_pagelinks_target ON pagelinks(pl_namespace, pl_title);

CREATE TABLE IF NOT EXISTS categorylinks (
    cl_from INTEGER NOT NULL,
    cl_to TEXT NOT NULL,
    cl_type TEXT NOT NULL DEFAULT 'page',
    PRIMARY KEY (cl_from, cl_to)
);
CREATE INDEX IF NOT EXISTS idx_categorylinks_to ON categorylinks(cl_to, cl_type);

CREATE TABLE IF NOT EXISTS templatelinks (
    tl_from INTEGER NOT NULL,
    tl_namespace INTEGER NOT NULL,
    tl_title TEXT NOT NULL,
    PRIMARY KEY (tl_from, tl_namespace, tl_title)
);

CREATE TABLE IF NOT EXISTS imagelinks (
    il_from INTEGER NOT NULL,
    il_to TEXT NOT NULL,
    PRIMARY KEY (il_from, il_to)
);

CREATE TABLE IF NOT EXISTS recentchanges (
    rc_id INTEGER PRIMARY KEY,
    rc_namespace INTEGER NOT NULL,
    rc_title TEXT NOT NULL,
    rc_this_oldid INTEGER NOT NULL DEFAULT 0,
    rc_timestamp TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_recentchanges_title ON recentchanges(rc_namespace, rc_title);

CREATE TABLE IF NOT EXISTS logging (
    log_id INTEGER PRIMARY KEY,
    log_type TEXT NOT NULL,
    log_action TEXT NOT NULL DEFAULT '',
    log_namespace INTEGER NOT NULL,
    log_title TEXT NOT NULL,
    log_timestamp TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_logging_title ON logging(log_namespace, log_title);

CREATE TABLE IF NOT EXISTS watchlist (
    wl_id INTEGER PRIMARY KEY,
    wl_user INTEGER NOT NULL,
    wl_namespace INTEGER NOT NULL,
    wl_title TEXT NOT NULL,
    UNIQUE (wl_user, wl_namespace, wl_title)
);
CREATE INDEX IF NOT EXISTS idx_watchlist_title ON watchlist(wl_namespace, wl_title);

CREATE TABLE IF NOT EXISTS category (
    cat_id INTEGER PRIMARY KEY,
    cat_title TEXT NOT NULL UNIQUE,
    cat_pages INTEGER NOT NULL DEFAULT 0,
    cat_subcats INTEGER NOT NULL DEFAULT 0,
    cat_files INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS image (
    img_name TEXT PRIMARY KEY,
    img_size INTEGER NOT NULL DEFAULT 0,
    img_sha1 TEXT NOT NULL DEFAULT '',
    img_timestamp TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS oldimage (
    oi_name TEXT NOT NULL,
    oi_archive_name TEXT NOT NULL,
    oi_size INTEGER NOT NULL DEFAULT 0,
    oi_timestamp TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (oi_name, oi_archive_name)
);

CREATE TABLE IF NOT EXISTS filearchive (
    fa_id INTEGER PRIMARY KEY,
    fa_name TEXT NOT NULL,
    fa_storage_key TEXT,
    fa_timestamp TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_filearchive_name ON filearchive(fa_name);
"#;

/// One text blob per revision.
const LEGACY_REVISION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS revision (
    rev_id INTEGER PRIMARY KEY,
    rev_page INTEGER NOT NULL,
    rev_text_id INTEGER NOT NULL DEFAULT 0,
    rev_timestamp TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_revision_page ON revision(rev_page);

CREATE TABLE IF NOT EXISTS archive (
    ar_id INTEGER PRIMARY KEY,
    ar_namespace INTEGER NOT NULL,
    ar_title TEXT NOT NULL,
    ar_rev_id INTEGER NOT NULL,
    ar_text_id INTEGER NOT NULL DEFAULT 0,
    ar_timestamp TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_archive_title ON archive(ar_namespace, ar_title);
"#;

/// Revisions reference shared content units through slots.
const SLOTS_REVISION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS revision (
    rev_id INTEGER PRIMARY KEY,
    rev_page INTEGER NOT NULL,
    rev_timestamp TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_revision_page ON revision(rev_page);

CREATE TABLE IF NOT EXISTS archive (
    ar_id INTEGER PRIMARY KEY,
    ar_namespace INTEGER NOT NULL,
    ar_title TEXT NOT NULL,
    ar_rev_id INTEGER NOT NULL,
    ar_timestamp TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_archive_title ON archive(ar_namespace, ar_title);

CREATE TABLE IF NOT EXISTS content (
    content_id INTEGER PRIMARY KEY,
    content_size INTEGER NOT NULL DEFAULT 0,
    content_sha1 TEXT NOT NULL DEFAULT '',
    content_model INTEGER NOT NULL DEFAULT 1,
    content_address TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS slots (
    slot_revision_id INTEGER NOT NULL,
    slot_role_id INTEGER NOT NULL,
    slot_content_id INTEGER NOT NULL REFERENCES content(content_id),
    slot_origin INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (slot_revision_id, slot_role_id)
);
CREATE INDEX IF NOT EXISTS idx_slots_content ON slots(slot_content_id);
"#;

const SEARCH_INDEX_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS searchindex (
    si_page INTEGER PRIMARY KEY,
    si_title TEXT NOT NULL DEFAULT '',
    si_text TEXT NOT NULL DEFAULT ''
);
"#;
