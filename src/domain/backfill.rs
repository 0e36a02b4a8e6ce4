//! Backfill cursor state and the results it reports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::OrderId;

/// Persisted resumable cursor state for the backfill job.
///
/// Saved after every batch so the job survives timeouts, crashes, and
/// restarts without re-scanning or re-counting already-processed orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillState {
    /// Highest order id folded in so far; batches select ids above this.
    pub last_processed_id: OrderId,
    /// Cumulative orders processed across all batches.
    pub processed: u64,
    /// Estimate of orders still to process. Exact only at job start.
    pub remaining: u64,
    pub is_running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl BackfillState {
    pub fn fresh(remaining: u64, now: DateTime<Utc>) -> Self {
        Self {
            last_processed_id: OrderId::new(0),
            processed: 0,
            remaining,
            is_running: true,
            started_at: Some(now),
            updated_at: now,
        }
    }

    pub fn completed(&self) -> bool {
        self.started_at.is_some() && !self.is_running && self.remaining == 0
    }
}

/// Snapshot exposed on the administrative surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackfillStatus {
    pub processed: u64,
    pub remaining: u64,
    pub is_running: bool,
    pub completed: bool,
}

impl BackfillStatus {
    /// Status before the job has ever run.
    pub fn not_started() -> Self {
        Self {
            processed: 0,
            remaining: 0,
            is_running: false,
            completed: false,
        }
    }
}

impl From<&BackfillState> for BackfillStatus {
    fn from(state: &BackfillState) -> Self {
        Self {
            processed: state.processed,
            remaining: state.remaining,
            is_running: state.is_running,
            completed: state.completed(),
        }
    }
}

/// Result of one backfill batch invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub processed: u64,
    pub errors: u64,
    /// Cursor after this batch: the highest order id seen, advanced even
    /// when some orders errored so a poison record cannot stall the job.
    pub cursor: OrderId,
    pub remaining: u64,
    pub completed: bool,
}
