//! Deferred category aggregate refresh.
//!
//! Purges enqueue the categories the page belonged to; a worker drains the
//! queue and recomputes each category's counts from its memberships. The
//! queue is bounded and a purge never waits on it: when it is full or the
//! worker is gone the purger recomputes the category itself.

use expunge_metadata::models::CategoryCounts;
use expunge_metadata::repos::CategoryRepo;
use expunge_metadata::{MetadataResult, MetadataStore};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Create a connected queue and worker.
pub fn refresh_channel(
    capacity: usize,
    metadata: Arc<dyn MetadataStore>,
) -> (RefreshQueue, RefreshWorker) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RefreshQueue { tx }, RefreshWorker { rx, metadata })
}

/// Producer half, cloned into each purger.
#[derive(Clone, Debug)]
pub struct RefreshQueue {
    tx: mpsc::Sender<String>,
}

impl RefreshQueue {
    /// Queue a category for refresh. Returns false if it could not be queued.
    pub fn enqueue(&self, category: &str) -> bool {
        match self.tx.try_send(category.to_string()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(category = %category, "Category refresh queue full");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(category = %category, "Category refresh worker stopped");
                false
            }
        }
    }
}

/// Result of refreshing one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    Refreshed(CategoryCounts),
    /// No category row exists; nothing to update.
    Skipped,
}

/// Recompute one category's counts.
pub async fn refresh_category(
    repo: &dyn CategoryRepo,
    category: &str,
) -> MetadataResult<RefreshOutcome> {
    Ok(match repo.refresh_category_counts(category).await? {
        Some(counts) => RefreshOutcome::Refreshed(counts),
        None => RefreshOutcome::Skipped,
    })
}

/// Totals for one worker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub refreshed: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Consumer half.
pub struct RefreshWorker {
    rx: mpsc::Receiver<String>,
    metadata: Arc<dyn MetadataStore>,
}

impl RefreshWorker {
    /// Process categories until every queue handle has been dropped.
    ///
    /// Failed refreshes are logged and not retried; the next purge touching
    /// the category refreshes it again.
    pub async fn run_until_closed(mut self) -> RefreshReport {
        let mut report = RefreshReport::default();

        while let Some(category) = self.rx.recv().await {
            match refresh_category(self.metadata.as_ref(), &category).await {
                Ok(RefreshOutcome::Refreshed(counts)) => {
                    tracing::debug!(
                        category = %category,
                        pages = counts.pages,
                        subcats = counts.subcats,
                        files = counts.files,
                        "Category counts refreshed"
                    );
                    report.refreshed += 1;
                }
                Ok(RefreshOutcome::Skipped) => {
                    tracing::debug!(category = %category, "Category row missing, skipped");
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(category = %category, error = %e, "Category refresh failed");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            refreshed = report.refreshed,
            skipped = report.skipped,
            failed = report.failed,
            "Category refresh worker finished"
        );
        report
    }

    /// Run the worker on the tokio runtime.
    pub fn spawn(self) -> JoinHandle<RefreshReport> {
        tokio::spawn(self.run_until_closed())
    }
}
