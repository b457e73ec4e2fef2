//! Schema capability probing.

use crate::error::{MetadataError, MetadataResult};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Storage layout of revision content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentLayout {
    /// One text blob per revision, referenced by `rev_text_id` / `ar_text_id`.
    Legacy,
    /// Revisions reference deduplicated content units through `slots`.
    MultiUnit,
}

impl ContentLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::MultiUnit => "multi-unit",
        }
    }

    /// Decide the layout from the presence of the `slots` table and the
    /// `revision.rev_text_id` column.
    pub fn detect(has_slots_table: bool, has_rev_text_id: bool) -> MetadataResult<Self> {
        match (has_slots_table, has_rev_text_id) {
            (true, _) => Ok(Self::MultiUnit),
            (false, true) => Ok(Self::Legacy),
            (false, false) => Err(MetadataError::UnsupportedSchema(
                "no slots table and no revision.rev_text_id column".to_string(),
            )),
        }
    }
}

impl fmt::Display for ContentLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Features of the connected schema that change the purge cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaCapabilities {
    pub content_layout: ContentLayout,
    /// The schema has a `searchindex` table.
    pub search_index: bool,
}

/// Repository for schema inspection.
#[async_trait]
pub trait SchemaRepo: Send + Sync {
    /// Inspect the live schema.
    async fn probe_capabilities(&self) -> MetadataResult<SchemaCapabilities>;
}
