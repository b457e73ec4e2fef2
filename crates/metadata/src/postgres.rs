//! PostgreSQL-based metadata store implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::*;
use crate::repos::schema::{ContentLayout, SchemaCapabilities};
use crate::repos::{
    CategoryRepo, PageIdRelation, PageRepo, PurgeRepo, PurgeTransaction, SchemaRepo,
    TitleRelation,
};
use crate::store::{MetadataStore, PAGE_COLUMNS};
use async_trait::async_trait;
use expunge_core::config::{BootstrapLayout, PgSslMode, SchemaBootstrap};
use expunge_core::{Namespace, PageKey};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode as SqlxPgSslMode};
use sqlx::{Pool, Postgres, Transaction};
use std::str::FromStr;

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");
const POSTGRES_LEGACY_SCHEMA: &str = include_str!("postgres_schema_legacy.sql");
const POSTGRES_SLOTS_SCHEMA: &str = include_str!("postgres_schema_slots.sql");
const POSTGRES_SEARCH_SCHEMA: &str = include_str!("postgres_schema_search.sql");

fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

fn postgres_schema_parts(bootstrap: &SchemaBootstrap) -> Vec<&'static str> {
    let mut parts = vec![
        POSTGRES_SCHEMA,
        match bootstrap.layout {
            BootstrapLayout::Legacy => POSTGRES_LEGACY_SCHEMA,
            BootstrapLayout::Slots => POSTGRES_SLOTS_SCHEMA,
        },
    ];
    if bootstrap.search_index {
        parts.push(POSTGRES_SEARCH_SCHEMA);
    }
    parts
}

/// PostgreSQL-based metadata store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
    bootstrap: SchemaBootstrap,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection URL.
    pub async fn from_url(
        url: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
        bootstrap: SchemaBootstrap,
    ) -> MetadataResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        Self::connect(opts, max_connections, statement_timeout_ms, bootstrap).await
    }

    /// Create a new PostgreSQL store from individual connection parameters.
    ///
    /// This allows credentials to be passed separately, e.g. the password
    /// through `EXPUNGE_METADATA__PASSWORD`.
    #[allow(clippy::too_many_arguments)]
    pub async fn from_params(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        database: &str,
        ssl_mode: Option<PgSslMode>,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
        bootstrap: SchemaBootstrap,
    ) -> MetadataResult<Self> {
        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database);

        if let Some(user) = username {
            opts = opts.username(user);
        }

        if let Some(pass) = password {
            opts = opts.password(pass);
        }

        if let Some(mode) = ssl_mode {
            let sqlx_mode = match mode {
                PgSslMode::Disable => SqlxPgSslMode::Disable,
                PgSslMode::Prefer => SqlxPgSslMode::Prefer,
                PgSslMode::Require => SqlxPgSslMode::Require,
            };
            opts = opts.ssl_mode(sqlx_mode);
        }

        // Log connection info without password
        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username.unwrap_or("<none>"),
            ssl_mode = ?ssl_mode,
            "Connecting to PostgreSQL with individual parameters"
        );

        Self::connect(opts, max_connections, statement_timeout_ms, bootstrap).await
    }

    async fn connect(
        mut opts: PgConnectOptions,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
        bootstrap: SchemaBootstrap,
    ) -> MetadataResult<Self> {
        // Bounds lock waits too, so a purge blocked behind another writer
        // fails instead of hanging.
        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{}ms", timeout_ms))]);
            tracing::info!("PostgreSQL statement_timeout set to {}ms", timeout_ms);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool, bootstrap };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    async fn table_exists(&self, table: &str) -> MetadataResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn column_exists(&self, table: &str, column: &str) -> MetadataResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2
            )
            "#,
        )
        .bind(table)
        .bind(column)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
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

        // PostgreSQL doesn't allow multiple statements in a single prepared statement,
        // so we split the schema and execute each statement separately.
        let mut tx = self.pool.begin().await?;
        for part in postgres_schema_parts(&self.bootstrap) {
            for statement in postgres_schema_statements(part) {
                sqlx::query(statement).execute(&mut *tx).await?;
            }
        }
        tx.commit().await?;

        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl PageRepo for PostgresStore {
    async fn get_page_by_id(&self, page_id: i64) -> MetadataResult<Option<PageRow>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM page WHERE page_id = $1"
        ))
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_page_by_key(&self, key: &PageKey) -> MetadataResult<Option<PageRow>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM page WHERE page_namespace = $1 AND page_title = $2"
        ))
        .bind(key.namespace.id())
        .bind(key.title.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_page_categories(&self, page_id: i64) -> MetadataResult<Vec<String>> {
        let names =
            sqlx::query_scalar("SELECT cl_to FROM categorylinks WHERE cl_from = $1 ORDER BY cl_to")
                .bind(page_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(names)
    }

    async fn count_revisions(&self, page_id: i64) -> MetadataResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revision WHERE rev_page = $1")
            .bind(page_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl CategoryRepo for PostgresStore {
    async fn get_category(&self, name: &str) -> MetadataResult<Option<CategoryRow>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT cat_id, cat_title, cat_pages, cat_subcats, cat_files FROM category WHERE cat_title = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn refresh_category_counts(&self, name: &str) -> MetadataResult<Option<CategoryCounts>> {
        let mut tx = self.pool.begin().await?;

        // Lock the aggregate row so concurrent recomputes apply in order.
        let cat_id: Option<i64> =
            sqlx::query_scalar("SELECT cat_id FROM category WHERE cat_title = $1 FOR UPDATE")
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
                COALESCE(SUM(CASE WHEN cl_type = 'subcat' THEN 1 ELSE 0 END), 0)::BIGINT,
                COALESCE(SUM(CASE WHEN cl_type = 'file' THEN 1 ELSE 0 END), 0)::BIGINT
            FROM categorylinks
            WHERE cl_to = $1
            "#,
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE category SET cat_pages = $1, cat_subcats = $2, cat_files = $3 WHERE cat_id = $4",
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
impl SchemaRepo for PostgresStore {
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
impl PurgeRepo for PostgresStore {
    async fn begin_purge(&self) -> MetadataResult<Box<dyn PurgeTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgPurgeTransaction { tx }))
    }
}

/// Purge unit of work on a PostgreSQL transaction.
struct PgPurgeTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PurgeTransaction for PgPurgeTransaction {
    async fn lock_page(&mut self, page_id: i64) -> MetadataResult<Option<PageRow>> {
        // A concurrent purge of the same page blocks here until the first
        // commits, then sees no row.
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM page WHERE page_id = $1 FOR UPDATE"
        ))
        .bind(page_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn page_categories(&mut self, page_id: i64) -> MetadataResult<Vec<String>> {
        let names =
            sqlx::query_scalar("SELECT cl_to FROM categorylinks WHERE cl_from = $1 ORDER BY cl_to")
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
            "DELETE FROM {} WHERE {} = $1",
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
            "DELETE FROM {} WHERE {} = $1 AND {} = $2",
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
        let ids = sqlx::query_scalar("SELECT rev_text_id FROM revision WHERE rev_page = $1")
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
            "SELECT ar_text_id FROM archive WHERE ar_namespace = $1 AND ar_title = $2",
        )
        .bind(namespace.id())
        .bind(title)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(ids)
    }

    async fn delete_text(&mut self, text_id: i64) -> MetadataResult<u64> {
        let result = sqlx::query("DELETE FROM text WHERE old_id = $1")
            .bind(text_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn revision_ids_for_page(&mut self, page_id: i64) -> MetadataResult<Vec<i64>> {
        let ids =
            sqlx::query_scalar("SELECT rev_id FROM revision WHERE rev_page = $1 ORDER BY rev_id")
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
            "SELECT ar_rev_id FROM archive WHERE ar_namespace = $1 AND ar_title = $2 ORDER BY ar_rev_id",
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
            WHERE s.slot_revision_id = $1
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
        // Serialize reference checks on the content row. A concurrent purge
        // holding the same unit waits here until the first commits, and then
        // no longer sees the committed slot deletions as references.
        sqlx::query("SELECT content_id FROM content WHERE content_id = $1 FOR UPDATE")
            .bind(content_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM slots WHERE slot_content_id = $1 AND slot_revision_id <> $2",
        )
        .bind(content_id)
        .bind(owning_revision_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(count as u64)
    }

    async fn delete_content(&mut self, content_id: i64) -> MetadataResult<u64> {
        let result = sqlx::query("DELETE FROM content WHERE content_id = $1")
            .bind(content_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_slot(&mut self, revision_id: i64, role_id: i64) -> MetadataResult<u64> {
        let result =
            sqlx::query("DELETE FROM slots WHERE slot_revision_id = $1 AND slot_role_id = $2")
                .bind(revision_id)
                .bind(role_id)
                .execute(&mut *self.tx)
                .await?;
        Ok(result.rows_affected())
    }

    async fn file_artifacts(&mut self, name: &str) -> MetadataResult<FileArtifactRows> {
        let current = sqlx::query_as::<_, ImageRow>(
            "SELECT img_name, img_size, img_sha1, img_timestamp FROM image WHERE img_name = $1",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        let archived = sqlx::query_as::<_, OldImageRow>(
            "SELECT oi_name, oi_archive_name, oi_size, oi_timestamp FROM oldimage WHERE oi_name = $1 ORDER BY oi_timestamp",
        )
        .bind(name)
        .fetch_all(&mut *self.tx)
        .await?;

        let deleted = sqlx::query_as::<_, FileArchiveRow>(
            "SELECT fa_id, fa_name, fa_storage_key FROM filearchive WHERE fa_name = $1 ORDER BY fa_id",
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
            "DELETE FROM filearchive WHERE fa_name = $1",
            "DELETE FROM oldimage WHERE oi_name = $1",
            "DELETE FROM image WHERE img_name = $1",
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
