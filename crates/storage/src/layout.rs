//! Hashed upload-directory layout.
//!
//! Files live in zones below the store root:
//!
//! ```text
//! <h1>/<h2>/<name>                   current version
//! archive/<h1>/<h2>/<archive_name>   superseded versions
//! thumb/<h1>/<h2>/<name>/...         rendered thumbnails
//! deleted/<k0>/<k1>/<k2>/<key>       soft-deleted versions
//! ```
//!
//! `<h1>`, `<h2>`, ... are successive prefixes of the hex SHA-256 of the
//! file name (`a`, `ab`, `abc`, ...). Deleted-zone keys are already content
//! hashes, so they are sharded by their own leading characters.

use expunge_core::config::MAX_HASH_LEVELS;
use sha2::{Digest, Sha256};

const ARCHIVE_ZONE: &str = "archive";
const THUMB_ZONE: &str = "thumb";
const DELETED_ZONE: &str = "deleted";
const DELETED_LEVELS: usize = 3;

/// Maps file names to artifact keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileLayout {
    hash_levels: u8,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self { hash_levels: 2 }
    }
}

impl FileLayout {
    /// Create a layout; levels above the supported maximum are clamped.
    pub fn new(hash_levels: u8) -> Self {
        Self {
            hash_levels: hash_levels.min(MAX_HASH_LEVELS),
        }
    }

    pub fn hash_levels(&self) -> u8 {
        self.hash_levels
    }

    /// Hash directory path for a file name, e.g. `a/ab`. Empty for zero levels.
    pub fn hash_path(&self, name: &str) -> String {
        let digest = hex::encode(Sha256::digest(name.as_bytes()));
        (1..=usize::from(self.hash_levels))
            .map(|len| &digest[..len])
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Key of the current version of a file.
    pub fn current_key(&self, name: &str) -> String {
        join_key(&[&self.hash_path(name), name])
    }

    /// Key of a superseded version. Archived versions are hashed by the
    /// file's name, not by the archive name.
    pub fn archive_key(&self, name: &str, archive_name: &str) -> String {
        join_key(&[ARCHIVE_ZONE, &self.hash_path(name), archive_name])
    }

    /// Directory holding every rendered thumbnail of a file.
    pub fn thumb_prefix(&self, name: &str) -> String {
        join_key(&[THUMB_ZONE, &self.hash_path(name), name])
    }

    /// Key of a soft-deleted version identified by its storage key.
    pub fn deleted_key(&self, storage_key: &str) -> String {
        let shards: Vec<&str> = storage_key
            .char_indices()
            .take(DELETED_LEVELS)
            .map(|(i, c)| &storage_key[i..i + c.len_utf8()])
            .collect();
        let mut parts = vec![DELETED_ZONE];
        parts.extend(shards);
        parts.push(storage_key);
        join_key(&parts)
    }
}

fn join_key(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}
