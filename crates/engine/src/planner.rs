//! Cascade planner and executor.
//!
//! A purge removes a page and every dependent row inside one metadata
//! transaction, then performs the side effects that cannot be rolled back:
//! binary artifact deletion, link-cache invalidation and category refresh
//! scheduling. Those run only once the transaction has committed. A category
//! the refresh queue cannot take is recomputed before the purge returns.

use crate::artifacts::{ArtifactPlan, ArtifactPurger, ArtifactReport};
use crate::content::{self, ContentPurger};
use crate::eligibility::{PurgeCandidate, check_eligibility};
use crate::error::{ArtifactPurgeFailure, IneligibleReason, PurgeError, PurgeResult};
use crate::link_cache::LinkCache;
use crate::refresh::{RefreshQueue, refresh_category};
use crate::resolver::SharedContentResolver;
use crate::stats::CascadeStats;
use expunge_core::config::PurgeConfig;
use expunge_core::{PageKey, PageTarget};
use expunge_metadata::models::PageRow;
use expunge_metadata::repos::{
    ContentLayout, PageIdRelation, PurgeTransaction, SchemaCapabilities, TitleRelation,
};
use expunge_metadata::{MetadataError, MetadataResult, MetadataStore};
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;

/// Whether the caller holds the right to purge pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Granted,
    Denied,
}

/// What a purge would remove, computed without side effects.
#[derive(Debug, Clone, Serialize)]
pub struct PurgePreview {
    pub page_id: i64,
    pub page: PageKey,
    pub is_redirect: bool,
    pub revisions: u64,
    pub categories: Vec<String>,
    pub content_layout: ContentLayout,
}

/// Result of a committed purge.
#[derive(Debug, Clone, Serialize)]
pub struct PurgeOutcome {
    pub page_id: i64,
    pub page: PageKey,
    pub stats: CascadeStats,
    /// Present for file pages that had artifact rows.
    pub artifacts: Option<ArtifactReport>,
    pub categories_scheduled: Vec<String>,
    /// Categories the queue could not take, recomputed before returning.
    pub refreshed_inline: Vec<String>,
    /// Categories that could be neither queued nor recomputed.
    pub refresh_failed: Vec<String>,
    #[serde(skip)]
    pub purged_at: OffsetDateTime,
}

impl PurgeOutcome {
    /// Artifacts left behind after the relational purge committed.
    pub fn artifact_failures(&self) -> &[ArtifactPurgeFailure] {
        self.artifacts
            .as_ref()
            .map(|report| report.failures.as_slice())
            .unwrap_or(&[])
    }
}

/// Rows captured and removed inside the transaction.
struct Cascade {
    stats: CascadeStats,
    categories: Vec<String>,
    artifact_plan: Option<ArtifactPlan>,
}

/// Permanent-deletion engine.
///
/// The schema is probed once on construction; the content strategy chosen
/// then is used for every purge this instance runs.
pub struct Purger {
    metadata: Arc<dyn MetadataStore>,
    artifacts: ArtifactPurger,
    link_cache: Arc<dyn LinkCache>,
    refresh: RefreshQueue,
    config: PurgeConfig,
    capabilities: SchemaCapabilities,
    content: Box<dyn ContentPurger>,
}

impl Purger {
    pub async fn new(
        metadata: Arc<dyn MetadataStore>,
        artifacts: ArtifactPurger,
        link_cache: Arc<dyn LinkCache>,
        refresh: RefreshQueue,
        config: PurgeConfig,
    ) -> MetadataResult<Self> {
        let capabilities = metadata.probe_capabilities().await?;
        let resolver = SharedContentResolver::new(config.delete_shared_content_on_orphan);
        let content = content::for_capabilities(&capabilities, resolver);

        tracing::info!(
            content_layout = %capabilities.content_layout,
            search_index = capabilities.search_index,
            delete_shared_content_on_orphan = resolver.deletes_orphans(),
            "Purge engine ready"
        );

        Ok(Self {
            metadata,
            artifacts,
            link_cache,
            refresh,
            config,
            capabilities,
            content,
        })
    }

    pub fn capabilities(&self) -> &SchemaCapabilities {
        &self.capabilities
    }

    pub fn config(&self) -> &PurgeConfig {
        &self.config
    }

    /// Check eligibility without side effects.
    ///
    /// Lookup failures surface as `CascadeFailed`; nothing has been mutated
    /// at that point.
    pub async fn check(&self, target: &PageTarget) -> PurgeResult<PurgeCandidate> {
        let page = self.lookup(target).await?;
        Ok(check_eligibility(page.as_ref(), &self.config)?)
    }

    /// Describe what a purge of `target` would remove.
    pub async fn preview(&self, target: &PageTarget) -> PurgeResult<PurgePreview> {
        let candidate = self.check(target).await?;
        let revisions = self
            .metadata
            .count_revisions(candidate.page_id)
            .await
            .map_err(PurgeError::CascadeFailed)?;
        let categories = self
            .metadata
            .get_page_categories(candidate.page_id)
            .await
            .map_err(PurgeError::CascadeFailed)?;

        Ok(PurgePreview {
            page_id: candidate.page_id,
            page: candidate.key,
            is_redirect: candidate.is_redirect,
            revisions,
            categories,
            content_layout: self.capabilities.content_layout,
        })
    }

    /// Permanently delete a page and everything that depends on it.
    pub async fn purge(
        &self,
        target: &PageTarget,
        authorization: Authorization,
    ) -> PurgeResult<PurgeOutcome> {
        if authorization == Authorization::Denied {
            tracing::warn!(page = %target, "Purge refused: caller lacks permission");
            return Err(PurgeError::PermissionDenied);
        }

        let candidate = match self.check(target).await {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::info!(page = %target, error = %e, "Purge rejected");
                return Err(e);
            }
        };

        let mut tx = self
            .metadata
            .begin_purge()
            .await
            .map_err(PurgeError::CascadeFailed)?;

        // Another purge may have committed between the check and the lock.
        let locked = match tx.lock_page(candidate.page_id).await {
            Ok(row) => row,
            Err(e) => return Err(self.abort(tx, &candidate, e).await),
        };
        if let Err(reason) = revalidate(locked.as_ref(), &candidate, &self.config) {
            tracing::info!(
                page_id = candidate.page_id,
                reason = %reason,
                "Page changed before it could be locked, purge abandoned"
            );
            if let Err(e) = tx.rollback().await {
                tracing::warn!(error = %e, "Rollback after failed re-validation failed");
            }
            return Err(PurgeError::Ineligible(reason));
        }

        let cascade = match self.run_cascade(tx.as_mut(), &candidate).await {
            Ok(cascade) => cascade,
            Err(e) => return Err(self.abort(tx, &candidate, e).await),
        };

        if let Err(e) = tx.commit().await {
            tracing::error!(
                page_id = candidate.page_id,
                error = %e,
                "Purge commit failed"
            );
            return Err(PurgeError::CascadeFailed(e));
        }

        tracing::info!(
            page_id = candidate.page_id,
            page = %candidate.key,
            rows = cascade.stats.total_rows(),
            content_deleted = cascade.stats.content_deleted,
            content_retained = cascade.stats.content_retained,
            "Page purged"
        );

        Ok(self.after_commit(candidate, cascade).await)
    }

    async fn lookup(&self, target: &PageTarget) -> PurgeResult<Option<PageRow>> {
        let row = match target {
            PageTarget::Id(id) => self.metadata.get_page_by_id(id.get()).await,
            PageTarget::Key(key) => self.metadata.get_page_by_key(key).await,
        };
        row.map_err(PurgeError::CascadeFailed)
    }

    async fn abort(
        &self,
        tx: Box<dyn PurgeTransaction>,
        candidate: &PurgeCandidate,
        error: MetadataError,
    ) -> PurgeError {
        tracing::error!(
            page_id = candidate.page_id,
            error = %error,
            "Purge cascade failed, rolling back"
        );
        if let Err(e) = tx.rollback().await {
            tracing::warn!(page_id = candidate.page_id, error = %e, "Rollback failed");
        }
        PurgeError::CascadeFailed(error)
    }

    async fn run_cascade(
        &self,
        tx: &mut dyn PurgeTransaction,
        candidate: &PurgeCandidate,
    ) -> MetadataResult<Cascade> {
        let page_id = candidate.page_id;
        let key = &candidate.key;
        let title = key.title.as_str();
        let mut stats = CascadeStats::default();

        // Memberships must be read before categorylinks is cleared.
        let categories = tx.page_categories(page_id).await?;

        for relation in PageIdRelation::DIRECT {
            if relation == PageIdRelation::SearchIndex && !self.capabilities.search_index {
                continue;
            }
            let deleted = tx.delete_by_page_id(relation, page_id).await?;
            stats.record(relation.table(), deleted);
        }

        self.content
            .purge_content(tx, page_id, key, &mut stats)
            .await?;

        for relation in [PageIdRelation::Revision, PageIdRelation::ImageLinks] {
            let deleted = tx.delete_by_page_id(relation, page_id).await?;
            stats.record(relation.table(), deleted);
        }

        for relation in [
            TitleRelation::RecentChanges,
            TitleRelation::Archive,
            TitleRelation::Logging,
        ] {
            let deleted = tx.delete_by_title(relation, key.namespace, title).await?;
            stats.record(relation.table(), deleted);
        }

        let mut watch_namespaces = vec![key.namespace];
        watch_namespaces.extend(key.namespace.counterpart());
        for namespace in watch_namespaces {
            let deleted = tx
                .delete_by_title(TitleRelation::Watchlist, namespace, title)
                .await?;
            stats.record(TitleRelation::Watchlist.table(), deleted);
        }

        let deleted = tx.delete_by_page_id(PageIdRelation::Page, page_id).await?;
        stats.record(PageIdRelation::Page.table(), deleted);

        let mut artifact_plan = None;
        if key.namespace.is_file() {
            let rows = tx.file_artifacts(title).await?;
            artifact_plan = ArtifactPlan::from_rows(title, &rows, self.artifacts.layout());
            stats.record("file", tx.delete_file_rows(title).await?);
        }

        Ok(Cascade {
            stats,
            categories,
            artifact_plan,
        })
    }

    async fn after_commit(&self, candidate: PurgeCandidate, cascade: Cascade) -> PurgeOutcome {
        let artifacts = match &cascade.artifact_plan {
            Some(plan) => Some(self.artifacts.execute(plan).await),
            None => None,
        };

        self.link_cache.invalidate(&candidate.key);

        let mut categories_scheduled = Vec::new();
        let mut refreshed_inline = Vec::new();
        let mut refresh_failed = Vec::new();
        for category in cascade.categories {
            if self.refresh.enqueue(&category) {
                categories_scheduled.push(category);
                continue;
            }
            // No transaction is open any more, so recomputing here holds no
            // lock on the purged page.
            match refresh_category(self.metadata.as_ref(), &category).await {
                Ok(outcome) => {
                    tracing::debug!(category = %category, ?outcome, "Category refreshed inline");
                    refreshed_inline.push(category);
                }
                Err(e) => {
                    tracing::warn!(category = %category, error = %e, "Inline category refresh failed");
                    refresh_failed.push(category);
                }
            }
        }

        PurgeOutcome {
            page_id: candidate.page_id,
            page: candidate.key,
            stats: cascade.stats,
            artifacts,
            categories_scheduled,
            refreshed_inline,
            refresh_failed,
            purged_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Re-apply eligibility to the row read under the transaction.
fn revalidate(
    locked: Option<&PageRow>,
    candidate: &PurgeCandidate,
    config: &PurgeConfig,
) -> Result<(), IneligibleReason> {
    let current = check_eligibility(locked, config)?;
    if current.key != candidate.key {
        // Renamed in between; the title-keyed relations no longer match.
        return Err(IneligibleReason::NotFound);
    }
    Ok(())
}
