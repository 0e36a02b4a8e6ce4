//! Cleanup job report.

use serde::Serialize;

/// Rows removed by one cleanup pass, by reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CleanupReport {
    /// Pair rows below the noise floor.
    pub low_count_deleted: u64,
    /// Pair rows referencing products missing from the catalog.
    pub orphaned_deleted: u64,
    /// Pair rows not updated within the retention window.
    pub stale_deleted: u64,
}

impl CleanupReport {
    pub fn total(&self) -> u64 {
        self.low_count_deleted + self.orphaned_deleted + self.stale_deleted
    }
}
