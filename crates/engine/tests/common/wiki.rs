//! Test wiki environments backed by SQLite or PostgreSQL.

use expunge_core::PageKey;
use expunge_core::config::{PurgeConfig, SchemaBootstrap};
use expunge_engine::{ArtifactPurger, LinkCache, Purger, RefreshWorker, refresh_channel};
use expunge_metadata::{MetadataError, MetadataResult, MetadataStore, PostgresStore, SqliteStore};
use expunge_storage::{FileLayout, FilesystemBackend};
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Postgres as SqlxPostgres, Row, Sqlite};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;

/// Stable prefix for Docker/container startup failures in Postgres test setup.
pub const POSTGRES_CONTAINER_START_ERR_PREFIX: &str = "postgres-container-start:";

/// Raw access to the database behind a test wiki.
#[derive(Clone)]
pub enum TestDb {
    Sqlite(Pool<Sqlite>),
    Postgres(Pool<SqlxPostgres>),
}

#[allow(dead_code)]
impl TestDb {
    /// Execute a script of `;`-separated statements.
    pub async fn exec(&self, script: &str) {
        for statement in script.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let result = match self {
                TestDb::Sqlite(pool) => sqlx::query(statement).execute(pool).await.map(|_| ()),
                TestDb::Postgres(pool) => sqlx::query(statement).execute(pool).await.map(|_| ()),
            };
            result.unwrap_or_else(|e| panic!("fixture statement failed: {statement}: {e}"));
        }
    }

    /// Execute one statement verbatim, e.g. a trigger body containing `;`.
    pub async fn exec_raw(&self, statement: &str) {
        let result = match self {
            TestDb::Sqlite(pool) => sqlx::query(statement).execute(pool).await.map(|_| ()),
            TestDb::Postgres(pool) => sqlx::query(statement).execute(pool).await.map(|_| ()),
        };
        result.unwrap_or_else(|e| panic!("statement failed: {statement}: {e}"));
    }

    /// Run a query returning a single integer.
    pub async fn scalar(&self, sql: &str) -> i64 {
        match self {
            TestDb::Sqlite(pool) => sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await,
            TestDb::Postgres(pool) => sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await,
        }
        .unwrap_or_else(|e| panic!("scalar query failed: {sql}: {e}"))
    }

    /// Number of rows in a table.
    pub async fn count(&self, table: &str) -> i64 {
        self.scalar(&format!("SELECT COUNT(*) FROM {table}")).await
    }

    /// Number of rows in a table matching a condition.
    pub async fn count_where(&self, table: &str, condition: &str) -> i64 {
        self.scalar(&format!("SELECT COUNT(*) FROM {table} WHERE {condition}"))
            .await
    }

    /// Every row of every table, rendered as text and sorted per table.
    pub async fn snapshot(&self, tables: &[&str]) -> Vec<(String, Vec<String>)> {
        let mut tables_rows = Vec::with_capacity(tables.len());
        for table in tables {
            let sql = format!("SELECT * FROM {table}");
            let mut rows: Vec<String> = match self {
                TestDb::Sqlite(pool) => sqlx::query(&sql)
                    .fetch_all(pool)
                    .await
                    .unwrap_or_else(|e| panic!("snapshot of {table} failed: {e}"))
                    .iter()
                    .map(sqlite_row_text)
                    .collect(),
                TestDb::Postgres(pool) => sqlx::query(&sql)
                    .fetch_all(pool)
                    .await
                    .unwrap_or_else(|e| panic!("snapshot of {table} failed: {e}"))
                    .iter()
                    .map(pg_row_text)
                    .collect(),
            };
            rows.sort();
            tables_rows.push((table.to_string(), rows));
        }
        tables_rows
    }

    pub fn is_postgres(&self) -> bool {
        matches!(self, TestDb::Postgres(_))
    }
}

fn sqlite_row_text(row: &SqliteRow) -> String {
    (0..row.columns().len())
        .map(|i| {
            if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
                format!("{v:?}")
            } else if let Ok(v) = row.try_get::<Option<String>, _>(i) {
                format!("{v:?}")
            } else if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
                format!("{v:?}")
            } else {
                format!("{:?}", row.try_get::<Option<Vec<u8>>, _>(i).ok())
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn pg_row_text(row: &PgRow) -> String {
    (0..row.columns().len())
        .map(|i| {
            if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
                format!("{v:?}")
            } else if let Ok(v) = row.try_get::<Option<i32>, _>(i) {
                format!("{v:?}")
            } else if let Ok(v) = row.try_get::<Option<String>, _>(i) {
                format!("{v:?}")
            } else if let Ok(v) = row.try_get::<Option<bool>, _>(i) {
                format!("{v:?}")
            } else {
                format!("{:?}", row.try_get::<Option<Vec<u8>>, _>(i).ok())
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Link cache that records every invalidated key.
#[derive(Default)]
pub struct RecordingLinkCache {
    invalidated: Mutex<Vec<PageKey>>,
}

#[allow(dead_code)]
impl RecordingLinkCache {
    pub fn invalidated(&self) -> Vec<PageKey> {
        self.invalidated.lock().unwrap().clone()
    }
}

impl LinkCache for RecordingLinkCache {
    fn invalidate(&self, key: &PageKey) {
        self.invalidated.lock().unwrap().push(key.clone());
    }
}

/// A wiki database plus an upload directory, cleaned up on drop.
#[allow(dead_code)]
pub struct TestWiki {
    pub metadata: Arc<dyn MetadataStore>,
    pub db: TestDb,
    pub artifacts: Arc<FilesystemBackend>,
    pub layout: FileLayout,
    pub link_cache: Arc<RecordingLinkCache>,
    _temp_dir: TempDir,
    _container: Option<ContainerAsync<Postgres>>,
}

#[allow(dead_code)]
impl TestWiki {
    /// SQLite wiki in a temporary directory.
    pub async fn sqlite(bootstrap: SchemaBootstrap) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store = SqliteStore::new(temp_dir.path().join("wiki.db"), None, bootstrap)
            .await
            .expect("Failed to create SQLite store");
        let db = TestDb::Sqlite(store.pool().clone());
        Self::assemble(Arc::new(store), db, temp_dir, None).await
    }

    /// PostgreSQL wiki in a fresh container.
    pub async fn postgres(bootstrap: SchemaBootstrap) -> MetadataResult<Self> {
        let container = Postgres::default()
            .with_tag("15-alpine")
            .start()
            .await
            .map_err(|e| {
                MetadataError::Internal(format!(
                    "{} Failed to start PostgreSQL container: {e}",
                    POSTGRES_CONTAINER_START_ERR_PREFIX
                ))
            })?;

        let host = container.get_host().await.expect("Failed to get host");
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get port");
        let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

        let store = PostgresStore::from_url(&url, 5, None, bootstrap).await?;
        let db = TestDb::Postgres(store.pool().clone());
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        Ok(Self::assemble(Arc::new(store), db, temp_dir, Some(container)).await)
    }

    async fn assemble(
        metadata: Arc<dyn MetadataStore>,
        db: TestDb,
        temp_dir: TempDir,
        container: Option<ContainerAsync<Postgres>>,
    ) -> Self {
        let artifacts = FilesystemBackend::new(temp_dir.path().join("images"))
            .await
            .expect("Failed to create upload directory");
        Self {
            metadata,
            db,
            artifacts: Arc::new(artifacts),
            layout: FileLayout::default(),
            link_cache: Arc::new(RecordingLinkCache::default()),
            _temp_dir: temp_dir,
            _container: container,
        }
    }

    /// Build a purger wired to this wiki, plus the worker draining its
    /// refresh queue.
    pub async fn purger(&self, config: PurgeConfig) -> (Purger, RefreshWorker) {
        self.purger_with_capacity(config, 16).await
    }

    pub async fn purger_with_capacity(
        &self,
        config: PurgeConfig,
        capacity: usize,
    ) -> (Purger, RefreshWorker) {
        let (queue, worker) = refresh_channel(capacity, self.metadata.clone());
        let purger = Purger::new(
            self.metadata.clone(),
            ArtifactPurger::new(self.artifacts.clone(), self.layout),
            self.link_cache.clone(),
            queue,
            config,
        )
        .await
        .expect("Failed to create purger");
        (purger, worker)
    }
}

/// Try to create a PostgreSQL wiki, skipping if Docker is unavailable
/// or SKIP_POSTGRES_TESTS is set.
#[allow(dead_code)]
pub async fn postgres_or_skip(bootstrap: SchemaBootstrap) -> Option<TestWiki> {
    if std::env::var("SKIP_POSTGRES_TESTS").is_ok() {
        return None;
    }
    match TestWiki::postgres(bootstrap).await {
        Ok(wiki) => Some(wiki),
        Err(err) => {
            let msg = err.to_string();
            if msg.contains(POSTGRES_CONTAINER_START_ERR_PREFIX) {
                eprintln!("Skipping PostgreSQL test (Docker unavailable): {msg}");
                None
            } else {
                panic!("PostgreSQL test setup failed: {msg}");
            }
        }
    }
}

/// Run a test against both SQLite and PostgreSQL wikis.
#[allow(dead_code)]
pub async fn run_engine_test_both<F, Fut>(bootstrap: SchemaBootstrap, test_fn: F)
where
    F: Fn(TestWiki) -> Fut + Clone,
    Fut: std::future::Future<Output = ()>,
{
    let sqlite = TestWiki::sqlite(bootstrap.clone()).await;
    test_fn.clone()(sqlite).await;

    if let Some(postgres) = postgres_or_skip(bootstrap).await {
        test_fn(postgres).await;
    }
}
