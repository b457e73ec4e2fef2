//! Binary artifact removal for purged files.
//!
//! Runs strictly after the relational purge commits. Failures here are
//! reported per key and never undo the committed purge.

use crate::error::ArtifactPurgeFailure;
use expunge_metadata::models::FileArtifactRows;
use expunge_storage::{ArtifactStore, FileLayout, StorageError};
use serde::Serialize;
use std::sync::Arc;

/// Storage keys belonging to one purged file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactPlan {
    pub current: Option<String>,
    pub archived: Vec<String>,
    pub thumb_prefix: Option<String>,
    pub deleted: Vec<String>,
}

impl ArtifactPlan {
    /// Resolve the rows captured inside the purge transaction to keys.
    ///
    /// Returns `None` when the file has no rows at all.
    pub fn from_rows(name: &str, rows: &FileArtifactRows, layout: &FileLayout) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        Some(Self {
            current: rows.current.as_ref().map(|_| layout.current_key(name)),
            archived: rows
                .archived
                .iter()
                .map(|row| layout.archive_key(name, &row.oi_archive_name))
                .collect(),
            thumb_prefix: Some(layout.thumb_prefix(name)),
            deleted: rows
                .deleted
                .iter()
                .filter_map(|row| row.fa_storage_key.as_deref())
                .filter(|key| !key.is_empty())
                .map(|key| layout.deleted_key(key))
                .collect(),
        })
    }

    /// Number of individual keys (the thumbnail prefix counts as one).
    pub fn len(&self) -> usize {
        usize::from(self.current.is_some())
            + self.archived.len()
            + usize::from(self.thumb_prefix.is_some())
            + self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of executing an [`ArtifactPlan`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    /// Artifacts removed, thumbnails counted individually.
    pub removed: u64,
    /// Keys that were already absent.
    pub already_gone: u64,
    pub failures: Vec<ArtifactPurgeFailure>,
}

/// Deletes a file's artifacts from the configured store.
#[derive(Clone)]
pub struct ArtifactPurger {
    store: Arc<dyn ArtifactStore>,
    layout: FileLayout,
}

impl ArtifactPurger {
    pub fn new(store: Arc<dyn ArtifactStore>, layout: FileLayout) -> Self {
        Self { store, layout }
    }

    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    /// Delete every key in the plan, continuing past failures.
    pub async fn execute(&self, plan: &ArtifactPlan) -> ArtifactReport {
        let mut report = ArtifactReport::default();

        for key in &plan.archived {
            self.delete_one(key, &mut report).await;
        }

        if let Some(prefix) = &plan.thumb_prefix {
            match self.store.delete_prefix(prefix).await {
                Ok(removed) => report.removed += removed,
                Err(e) => self.record_failure(prefix, e, &mut report),
            }
        }

        if let Some(key) = &plan.current {
            self.delete_one(key, &mut report).await;
        }

        for key in &plan.deleted {
            self.delete_one(key, &mut report).await;
        }

        tracing::info!(
            backend = self.store.backend_name(),
            removed = report.removed,
            already_gone = report.already_gone,
            failures = report.failures.len(),
            "File artifacts purged"
        );
        report
    }

    async fn delete_one(&self, key: &str, report: &mut ArtifactReport) {
        match self.store.delete(key).await {
            Ok(()) => report.removed += 1,
            Err(e) if e.is_not_found() => {
                tracing::debug!(key = %key, "Artifact already gone");
                report.already_gone += 1;
            }
            Err(e) => self.record_failure(key, e, report),
        }
    }

    fn record_failure(&self, key: &str, error: StorageError, report: &mut ArtifactReport) {
        tracing::warn!(
            key = %key,
            backend = self.store.backend_name(),
            error = %error,
            "Failed to delete artifact"
        );
        report.failures.push(ArtifactPurgeFailure {
            key: key.to_string(),
            message: error.to_string(),
        });
    }
}
