//! Shared-content reference resolver.

use expunge_metadata::MetadataResult;
use expunge_metadata::repos::PurgeTransaction;

/// Decides whether a content unit can be deleted along with a revision.
///
/// Runs on the purge transaction so the reference count reflects slot rows
/// already removed earlier in the same cascade.
#[derive(Debug, Clone, Copy)]
pub struct SharedContentResolver {
    delete_on_orphan: bool,
}

impl SharedContentResolver {
    pub fn new(delete_on_orphan: bool) -> Self {
        Self { delete_on_orphan }
    }

    pub fn deletes_orphans(&self) -> bool {
        self.delete_on_orphan
    }

    /// True when no revision other than `owning_revision_id` references the
    /// unit. Always false when orphan deletion is disabled.
    pub async fn should_delete(
        &self,
        tx: &mut dyn PurgeTransaction,
        content_id: i64,
        owning_revision_id: i64,
    ) -> MetadataResult<bool> {
        if !self.delete_on_orphan {
            return Ok(false);
        }

        let others = tx
            .count_other_references(content_id, owning_revision_id)
            .await?;
        if others > 0 {
            tracing::debug!(
                content_id = content_id,
                revision_id = owning_revision_id,
                references = others,
                "Content unit still referenced, retaining"
            );
        }
        Ok(others == 0)
    }
}
