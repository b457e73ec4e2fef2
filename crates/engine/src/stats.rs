//! Per-purge deletion counters.

use serde::Serialize;
use std::collections::BTreeMap;

/// Rows removed by one purge, keyed by table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeStats {
    pub rows: BTreeMap<&'static str, u64>,
    /// Content units whose blob and row were deleted.
    pub content_deleted: u64,
    /// Slots whose content unit was kept because another revision still
    /// referenced it at that point, or orphan deletion is disabled.
    pub content_retained: u64,
}

impl CascadeStats {
    pub fn record(&mut self, table: &'static str, deleted: u64) {
        *self.rows.entry(table).or_default() += deleted;
    }

    /// Rows deleted from one table; zero when the table was not touched.
    pub fn rows_for(&self, table: &str) -> u64 {
        self.rows.get(table).copied().unwrap_or(0)
    }

    pub fn total_rows(&self) -> u64 {
        self.rows.values().sum()
    }
}
