//! Revision content purge strategies, one per storage layout.

use crate::resolver::SharedContentResolver;
use crate::stats::CascadeStats;
use async_trait::async_trait;
use expunge_core::PageKey;
use expunge_metadata::MetadataResult;
use expunge_metadata::models::SlotContentRow;
use expunge_metadata::repos::{ContentLayout, PurgeTransaction, SchemaCapabilities};
use std::collections::BTreeMap;

/// Removes the content of every live and archived revision of a page.
///
/// Runs inside the purge transaction, before the revision and archive rows
/// themselves are deleted.
#[async_trait]
pub trait ContentPurger: Send + Sync {
    fn layout(&self) -> ContentLayout;

    async fn purge_content(
        &self,
        tx: &mut dyn PurgeTransaction,
        page_id: i64,
        key: &PageKey,
        stats: &mut CascadeStats,
    ) -> MetadataResult<()>;
}

/// Select the strategy for the probed schema.
pub fn for_capabilities(
    capabilities: &SchemaCapabilities,
    resolver: SharedContentResolver,
) -> Box<dyn ContentPurger> {
    match capabilities.content_layout {
        ContentLayout::Legacy => Box::new(LegacyContentPurger),
        ContentLayout::MultiUnit => Box::new(MultiUnitContentPurger { resolver }),
    }
}

/// One text blob per revision; blobs are never shared.
#[derive(Debug, Default)]
pub struct LegacyContentPurger;

#[async_trait]
impl ContentPurger for LegacyContentPurger {
    fn layout(&self) -> ContentLayout {
        ContentLayout::Legacy
    }

    async fn purge_content(
        &self,
        tx: &mut dyn PurgeTransaction,
        page_id: i64,
        key: &PageKey,
        stats: &mut CascadeStats,
    ) -> MetadataResult<()> {
        let mut text_ids = tx.legacy_text_ids_for_page(page_id).await?;
        text_ids.extend(
            tx.legacy_archived_text_ids(key.namespace, key.title.as_str())
                .await?,
        );
        text_ids.sort_unstable();
        text_ids.dedup();

        for text_id in text_ids.into_iter().filter(|id| *id > 0) {
            let deleted = tx.delete_text(text_id).await?;
            stats.record("text", deleted);
            stats.content_deleted += deleted;
        }
        Ok(())
    }
}

/// Revisions reference shared content units through slots.
#[derive(Debug)]
pub struct MultiUnitContentPurger {
    resolver: SharedContentResolver,
}

impl MultiUnitContentPurger {
    pub fn new(resolver: SharedContentResolver) -> Self {
        Self { resolver }
    }

    /// Decide the unit's fate, then drop its slot. Units that may go are
    /// collected in `orphans` and deleted once every slot of the page is gone,
    /// since another slot of the same revision can still point at them.
    async fn release_slot(
        &self,
        tx: &mut dyn PurgeTransaction,
        unit: &SlotContentRow,
        orphans: &mut BTreeMap<i64, SlotContentRow>,
        stats: &mut CascadeStats,
    ) -> MetadataResult<()> {
        let delete = self
            .resolver
            .should_delete(tx, unit.content_id, unit.slot_revision_id)
            .await?;

        let slots = tx
            .delete_slot(unit.slot_revision_id, unit.slot_role_id)
            .await?;
        stats.record("slots", slots);

        if delete {
            orphans
                .entry(unit.content_id)
                .or_insert_with(|| unit.clone());
        } else {
            stats.content_retained += 1;
        }
        Ok(())
    }

    async fn delete_unit(
        &self,
        tx: &mut dyn PurgeTransaction,
        unit: &SlotContentRow,
        stats: &mut CascadeStats,
    ) -> MetadataResult<()> {
        stats.record("content", tx.delete_content(unit.content_id).await?);
        match unit.text_id() {
            Some(text_id) => stats.record("text", tx.delete_text(text_id).await?),
            None => tracing::debug!(
                content_id = unit.content_id,
                address = %unit.content_address,
                "Content blob is not in the text table, leaving it in place"
            ),
        }
        stats.content_deleted += 1;
        Ok(())
    }
}

#[async_trait]
impl ContentPurger for MultiUnitContentPurger {
    fn layout(&self) -> ContentLayout {
        ContentLayout::MultiUnit
    }

    async fn purge_content(
        &self,
        tx: &mut dyn PurgeTransaction,
        page_id: i64,
        key: &PageKey,
        stats: &mut CascadeStats,
    ) -> MetadataResult<()> {
        let mut revision_ids = tx.revision_ids_for_page(page_id).await?;
        revision_ids.extend(
            tx.archived_revision_ids(key.namespace, key.title.as_str())
                .await?,
        );
        revision_ids.sort_unstable();
        revision_ids.dedup();

        let mut orphans = BTreeMap::new();
        for revision_id in revision_ids {
            for unit in tx.content_units_for_revision(revision_id).await? {
                self.release_slot(tx, &unit, &mut orphans, stats).await?;
            }
        }
        for unit in orphans.values() {
            self.delete_unit(tx, unit, stats).await?;
        }
        Ok(())
    }
}
