//! Configuration types shared across crates.

use crate::namespace::Namespace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Permanent-deletion policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PurgeConfig {
    /// Namespaces that permit permanent deletion. A namespace missing from
    /// the map, or mapped to `false`, is not eligible.
    ///
    /// Keys are namespace numbers; they are written as strings so the map can
    /// be expressed in TOML tables and environment variables
    /// (`EXPUNGE_PURGE__ELIGIBLE_NAMESPACES__6=true`).
    #[serde(default = "default_eligible_namespaces", with = "namespace_map")]
    pub eligible_namespaces: BTreeMap<Namespace, bool>,
    /// Delete a revision's content unit when no other revision references it.
    /// When false, content units are always retained: faster, but blobs of
    /// purged pages stay in storage.
    #[serde(default = "default_delete_shared_content_on_orphan")]
    pub delete_shared_content_on_orphan: bool,
}

fn default_eligible_namespaces() -> BTreeMap<Namespace, bool> {
    BTreeMap::from([(Namespace::MAIN, true), (Namespace::FILE, true)])
}

fn default_delete_shared_content_on_orphan() -> bool {
    true
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            eligible_namespaces: default_eligible_namespaces(),
            delete_shared_content_on_orphan: default_delete_shared_content_on_orphan(),
        }
    }
}

impl PurgeConfig {
    /// Whether the namespace is flagged eligible.
    pub fn is_namespace_eligible(&self, namespace: Namespace) -> bool {
        self.eligible_namespaces
            .get(&namespace)
            .copied()
            .unwrap_or(false)
    }

    /// Validate purge policy invariants.
    pub fn validate(&self) -> Result<(), String> {
        let virtual_enabled: Vec<String> = self
            .eligible_namespaces
            .iter()
            .filter(|(ns, enabled)| **enabled && ns.is_virtual())
            .map(|(ns, _)| ns.to_string())
            .collect();

        if !virtual_enabled.is_empty() {
            return Err(format!(
                "purge.eligible_namespaces enables virtual namespaces [{}]; \
                 virtual namespaces have no stored pages and can never be purged",
                virtual_enabled.join(", ")
            ));
        }
        Ok(())
    }
}

/// Serde adapter for namespace-keyed maps with string keys.
mod namespace_map {
    use super::Namespace;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(map: &BTreeMap<Namespace, bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        map.iter()
            .map(|(ns, enabled)| (ns.to_string(), *enabled))
            .collect::<BTreeMap<String, bool>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<Namespace, bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, bool>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, enabled)| {
                key.parse::<Namespace>()
                    .map(|ns| (ns, enabled))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

/// Revision content layout created when bootstrapping an empty database.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapLayout {
    /// One text blob per revision (`revision.rev_text_id`).
    Legacy,
    /// Slot/content tables with deduplicated content units.
    #[default]
    Slots,
}

/// Schema created on an empty database. Existing schemas are never altered;
/// the layout actually used at runtime is always probed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchemaBootstrap {
    #[serde(default)]
    pub layout: BootstrapLayout,
    /// Create the `searchindex` table.
    #[serde(default = "default_search_index")]
    pub search_index: bool,
}

fn default_search_index() -> bool {
    true
}

impl Default for SchemaBootstrap {
    fn default() -> Self {
        Self {
            layout: BootstrapLayout::default(),
            search_index: default_search_index(),
        }
    }
}

/// PostgreSQL SSL mode configuration.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PgSslMode {
    /// Disable SSL/TLS entirely.
    Disable,
    /// Prefer SSL/TLS but allow unencrypted connections (default).
    #[default]
    Prefer,
    /// Require SSL/TLS for all connections.
    Require,
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
        /// Query timeout in seconds (advisory only - SQLite cannot cancel
        /// running statements).
        #[serde(default = "default_sqlite_query_timeout_secs")]
        query_timeout_secs: Option<u64>,
        #[serde(default)]
        bootstrap: SchemaBootstrap,
    },
    /// PostgreSQL database.
    Postgres {
        /// Connection URL. Takes precedence over individual fields.
        url: Option<String>,
        host: Option<String>,
        #[serde(default = "default_pg_port")]
        port: Option<u16>,
        username: Option<String>,
        /// WARNING: Prefer EXPUNGE_METADATA__PASSWORD over storing in config.
        password: Option<String>,
        database: Option<String>,
        ssl_mode: Option<PgSslMode>,
        #[serde(default = "default_max_connections")]
        max_connections: u32,
        /// Statement timeout in milliseconds. Also bounds how long a purge
        /// waits on row locks held by other writers.
        #[serde(default = "default_statement_timeout_ms")]
        statement_timeout_ms: Option<u64>,
        #[serde(default)]
        bootstrap: SchemaBootstrap,
    },
}

fn default_max_connections() -> u32 {
    10
}

fn default_pg_port() -> Option<u16> {
    Some(5432)
}

fn default_statement_timeout_ms() -> Option<u64> {
    Some(300_000) // 5 minutes
}

fn default_sqlite_query_timeout_secs() -> Option<u64> {
    Some(600) // advisory only
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/wiki.db"),
            query_timeout_secs: default_sqlite_query_timeout_secs(),
            bootstrap: SchemaBootstrap::default(),
        }
    }
}

impl MetadataConfig {
    /// Validate metadata configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MetadataConfig::Sqlite { .. } => Ok(()),
            MetadataConfig::Postgres {
                url,
                host,
                database,
                max_connections,
                ..
            } => {
                if *max_connections == 0 {
                    return Err("postgres max_connections must be at least 1".to_string());
                }
                match (url.as_ref(), host.as_ref(), database.as_ref()) {
                    (Some(_), _, _) => Ok(()),
                    (None, Some(_), Some(_)) => Ok(()),
                    (None, None, _) => Err(
                        "postgres config requires either 'url' or 'host' + 'database'".to_string(),
                    ),
                    (None, Some(_), None) => Err(
                        "postgres config requires 'database' when using individual fields"
                            .to_string(),
                    ),
                }
            }
        }
    }
}

/// Binary artifact storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local upload directory.
    Filesystem {
        /// Root of the upload directory.
        path: PathBuf,
        /// Number of hashed directory levels below each zone (0-4).
        #[serde(default = "default_hash_levels")]
        hash_levels: u8,
    },
}

/// Upper bound for hashed directory levels.
pub const MAX_HASH_LEVELS: u8 = 4;

fn default_hash_levels() -> u8 {
    2
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/images"),
            hash_levels: default_hash_levels(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::Filesystem { hash_levels, .. } if *hash_levels > MAX_HASH_LEVELS => {
                Err(format!(
                    "storage.hash_levels {} exceeds maximum {}",
                    hash_levels, MAX_HASH_LEVELS
                ))
            }
            StorageConfig::Filesystem { .. } => Ok(()),
        }
    }

    pub fn hash_levels(&self) -> u8 {
        match self {
            StorageConfig::Filesystem { hash_levels, .. } => *hash_levels,
        }
    }
}

/// Deferred category refresh configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Capacity of the refresh queue. Purges never wait on a full queue;
    /// categories that do not fit are recomputed by the purge itself.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    1024
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl RefreshConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.queue_capacity == 0 {
            return Err("refresh.queue_capacity cannot be 0".to_string());
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub purge: PurgeConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl AppConfig {
    /// Validate every section, returning the first error.
    pub fn validate(&self) -> Result<(), String> {
        self.purge.validate()?;
        self.metadata.validate()?;
        self.storage.validate()?;
        self.refresh.validate()?;
        Ok(())
    }
}
