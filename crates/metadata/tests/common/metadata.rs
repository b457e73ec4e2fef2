//! Metadata store test utilities.

use expunge_core::config::SchemaBootstrap;
use expunge_metadata::{MetadataError, MetadataResult, MetadataStore, PostgresStore, SqliteStore};
use sqlx::{Pool, Postgres as SqlxPostgres, Sqlite};
use std::sync::Arc;
use tempfile::TempDir;
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;

/// Stable prefix for Docker/container startup failures in Postgres test setup.
/// Tests use this marker to decide whether to skip due to unavailable Docker.
pub const POSTGRES_CONTAINER_START_ERR_PREFIX: &str = "postgres-container-start:";

/// Raw access to the database behind a test store.
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

    pub fn is_postgres(&self) -> bool {
        matches!(self, TestDb::Postgres(_))
    }
}

/// A test metadata store wrapper that cleans up on drop.
#[allow(dead_code)]
pub struct TestMetadata {
    pub store: Arc<dyn MetadataStore>,
    pub(crate) sqlite_store: Arc<SqliteStore>,
    _temp_dir: TempDir,
}

impl TestMetadata {
    /// Create a SQLite store in a temporary directory with the default schema.
    pub async fn new() -> MetadataResult<Self> {
        Self::with_bootstrap(SchemaBootstrap::default()).await
    }

    /// Create a SQLite store bootstrapped with the given schema.
    pub async fn with_bootstrap(bootstrap: SchemaBootstrap) -> MetadataResult<Self> {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("wiki.db");
        let store = SqliteStore::new(&db_path, None, bootstrap).await?;
        let arc_store = Arc::new(store);

        Ok(Self {
            store: arc_store.clone(),
            sqlite_store: arc_store,
            _temp_dir: temp_dir,
        })
    }

    /// Get a reference to the metadata store.
    pub fn store(&self) -> Arc<dyn MetadataStore> {
        self.store.clone()
    }

    /// Get a reference to the SQLite connection pool for raw queries.
    #[allow(dead_code)]
    pub fn pool(&self) -> &Pool<Sqlite> {
        self.sqlite_store.pool()
    }

    pub fn db(&self) -> TestDb {
        TestDb::Sqlite(self.sqlite_store.pool().clone())
    }
}

/// PostgreSQL test metadata store wrapper that manages a testcontainer.
#[allow(dead_code)]
pub struct PostgresTestMetadata {
    pub store: Arc<dyn MetadataStore>,
    pub(crate) postgres_store: Arc<PostgresStore>,
    _container: ContainerAsync<Postgres>,
}

impl PostgresTestMetadata {
    /// Create a PostgreSQL test store with the default schema.
    pub async fn new() -> MetadataResult<Self> {
        Self::with_bootstrap(SchemaBootstrap::default()).await
    }

    /// Create a PostgreSQL test store bootstrapped with the given schema.
    pub async fn with_bootstrap(bootstrap: SchemaBootstrap) -> MetadataResult<Self> {
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

        // Default credentials from testcontainers-modules postgres
        let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

        let store = PostgresStore::from_url(&url, 5, None, bootstrap).await?;
        let arc_store = Arc::new(store);

        Ok(Self {
            store: arc_store.clone(),
            postgres_store: arc_store,
            _container: container,
        })
    }

    /// Get a reference to the metadata store.
    pub fn store(&self) -> Arc<dyn MetadataStore> {
        self.store.clone()
    }

    /// Get a reference to the PostgreSQL connection pool for raw queries.
    #[allow(dead_code)]
    pub fn pool(&self) -> &Pool<SqlxPostgres> {
        self.postgres_store.pool()
    }

    pub fn db(&self) -> TestDb {
        TestDb::Postgres(self.postgres_store.pool().clone())
    }
}

/// Try to create a PostgreSQL test store, skipping if Docker is unavailable
/// or SKIP_POSTGRES_TESTS is set.
///
/// Only container-start failures cause a skip. Schema or connection errors
/// still panic.
#[allow(dead_code)]
pub async fn postgres_or_skip(bootstrap: SchemaBootstrap) -> Option<PostgresTestMetadata> {
    if std::env::var("SKIP_POSTGRES_TESTS").is_ok() {
        return None;
    }
    match PostgresTestMetadata::with_bootstrap(bootstrap).await {
        Ok(metadata) => Some(metadata),
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

/// Run a test against both SQLite and PostgreSQL backends.
#[allow(dead_code)]
pub async fn run_metadata_test_both<F, Fut>(bootstrap: SchemaBootstrap, test_fn: F)
where
    F: Fn(Arc<dyn MetadataStore>, TestDb) -> Fut + Clone,
    Fut: std::future::Future<Output = ()>,
{
    let sqlite = TestMetadata::with_bootstrap(bootstrap.clone())
        .await
        .expect("Failed to create SQLite test metadata");
    test_fn.clone()(sqlite.store(), sqlite.db()).await;

    if let Some(postgres) = postgres_or_skip(bootstrap).await {
        test_fn(postgres.store(), postgres.db()).await;
    }
}
