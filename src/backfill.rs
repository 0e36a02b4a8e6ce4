//! Resumable batch replay of historical completed orders.
//!
//! Driven batch-by-batch by an external scheduler tick or an admin action;
//! the cursor is persisted after every batch, so a crash or timeout costs
//! at most one batch of re-reads and the collector's idempotency marker
//! keeps the re-reads from re-counting.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::cache::RecommendationCache;
use crate::collector::Collector;
use crate::domain::{BackfillState, BackfillStatus, BatchResult, OrderId};
use crate::error::Result;
use crate::host::OrderSource;
use crate::store::{BackfillStateStore, PairStore, StatStore};

/// Cursor-paginated backfill driver.
pub struct BackfillJob<S, H> {
    store: Arc<S>,
    host: Arc<H>,
    collector: Collector<S, H>,
}

impl<S, H> BackfillJob<S, H>
where
    S: PairStore + StatStore + BackfillStateStore,
    H: OrderSource,
{
    pub fn new(store: Arc<S>, host: Arc<H>, cache: Arc<RecommendationCache>) -> Self {
        let collector = Collector::new(store.clone(), host.clone(), cache);
        Self {
            store,
            host,
            collector,
        }
    }

    /// Run one batch: select up to `batch_size` unprocessed completed orders
    /// above the cursor, fold them in, advance and persist the cursor.
    ///
    /// The cursor advances to the highest order id seen even when some
    /// orders errored, so a poison record is skipped (and tallied) instead
    /// of stalling the job forever.
    pub async fn run_batch(&self, batch_size: i64) -> Result<BatchResult> {
        let now = Utc::now();

        let mut state = match self.store.load_state().await? {
            None => {
                // Job start: the one place the remaining count is computed
                // exactly. Every later batch only decrements the estimate.
                let remaining = self
                    .host
                    .count_completed_after(OrderId::new(0), true)
                    .await?;
                info!(remaining, "Backfill starting");
                BackfillState::fresh(remaining, now)
            }
            Some(state) if state.completed() => {
                // A completed job re-triggered: repair mode, pick up orders
                // that appeared (or failed) since the last run.
                let remaining = self
                    .host
                    .count_completed_after(state.last_processed_id, true)
                    .await?;
                info!(
                    cursor = %state.last_processed_id,
                    remaining,
                    "Backfill restarting from previous cursor"
                );
                BackfillState {
                    remaining,
                    is_running: true,
                    updated_at: now,
                    ..state
                }
            }
            Some(state) => state,
        };

        let page = self
            .host
            .completed_orders_after(state.last_processed_id, batch_size, true)
            .await?;

        if page.is_empty() {
            state.is_running = false;
            state.remaining = 0;
            state.updated_at = now;
            self.store.save_state(&state).await?;
            info!(processed = state.processed, "Backfill completed");
            return Ok(BatchResult {
                processed: 0,
                errors: 0,
                cursor: state.last_processed_id,
                remaining: 0,
                completed: true,
            });
        }

        let summary = self.collector.process_batch(&page).await;
        // Max id seen, errored orders included.
        let cursor = page.last().copied().unwrap_or(state.last_processed_id);

        state.last_processed_id = cursor;
        state.processed += summary.processed;
        state.remaining = state.remaining.saturating_sub(page.len() as u64);

        let completed = (page.len() as i64) < batch_size || state.remaining == 0;
        if completed {
            state.remaining = 0;
            state.is_running = false;
        }
        state.updated_at = now;

        // Crash-safe point: everything up to `cursor` is either folded in or
        // marked, so resuming from here never double-counts.
        self.store.save_state(&state).await?;

        if summary.errors > 0 {
            warn!(
                errors = summary.errors,
                cursor = %cursor,
                "Backfill batch skipped failing orders"
            );
        }
        info!(
            processed = summary.processed,
            errors = summary.errors,
            cursor = %cursor,
            remaining = state.remaining,
            completed,
            "Backfill batch finished"
        );

        Ok(BatchResult {
            processed: summary.processed,
            errors: summary.errors,
            cursor,
            remaining: state.remaining,
            completed,
        })
    }

    /// Administrative snapshot of the job.
    pub async fn status(&self) -> Result<BackfillStatus> {
        Ok(self
            .store
            .load_state()
            .await?
            .as_ref()
            .map(BackfillStatus::from)
            .unwrap_or_else(BackfillStatus::not_started))
    }
}
