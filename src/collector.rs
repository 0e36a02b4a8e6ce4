//! Folds completed orders into the pair and stats stores, exactly once.
//!
//! The processed marker is checked first and set last: a crash in between
//! re-does at most one order's increments after the marker check, and the
//! marker guarantees a completed order is never folded twice.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::RecommendationCache;
use crate::domain::{BatchSummary, OrderId, Outcome};
use crate::error::{Error, Result};
use crate::host::OrderSource;
use crate::store::{PairStore, StatStore};

/// Consumes one completed order at a time and updates both stores.
pub struct Collector<S, H> {
    store: Arc<S>,
    host: Arc<H>,
    cache: Arc<RecommendationCache>,
}

impl<S, H> Collector<S, H>
where
    S: PairStore + StatStore,
    H: OrderSource,
{
    pub fn new(store: Arc<S>, host: Arc<H>, cache: Arc<RecommendationCache>) -> Self {
        Self { store, host, cache }
    }

    /// Fold one completed order into the stores.
    ///
    /// Idempotent: an order already carrying the processed marker is
    /// skipped without touching any counter.
    pub async fn process(&self, order_id: OrderId) -> Result<Outcome> {
        if self.host.is_processed(order_id).await? {
            debug!(order_id = %order_id, "Order already processed, skipping");
            return Ok(Outcome::Skipped);
        }

        let order = self
            .host
            .load_order(order_id)
            .await?
            .ok_or(Error::OrderNotFound {
                order_id: order_id.as_i64(),
            })?;

        let products = order.distinct_products();

        // Per-product counts move for every completed order, pair counters
        // only when at least two distinct products co-occur.
        for product in &products {
            self.store.bump_order_count(product).await?;
        }

        let mut pairs = 0;
        if products.len() >= 2 {
            for i in 0..products.len() {
                for j in (i + 1)..products.len() {
                    self.store.bump_pair(&products[i], &products[j]).await?;
                    pairs += 1;
                }
            }
        }

        for product in &products {
            self.cache.invalidate_product(product);
        }

        // Marker last: a crash before this line costs one redundant retry,
        // never a lost or doubled count on the retry itself.
        self.host.mark_processed(order_id).await?;

        debug!(
            order_id = %order_id,
            products = products.len(),
            pairs,
            "Order folded into stores"
        );

        Ok(Outcome::Processed {
            products: products.len(),
            pairs,
        })
    }

    /// Fold a batch of orders, tolerating partial failure.
    ///
    /// One order's error never aborts the batch; it is logged and tallied.
    pub async fn process_batch(&self, order_ids: &[OrderId]) -> BatchSummary {
        let mut summary = BatchSummary {
            requested: order_ids.len() as u64,
            ..Default::default()
        };

        for &order_id in order_ids {
            match self.process(order_id).await {
                Ok(_) => summary.record_success(),
                Err(e) => {
                    warn!(order_id = %order_id, error = %e, "Failed to process order");
                    summary.record_error();
                }
            }
        }

        if summary.errors > 0 {
            info!(
                requested = summary.requested,
                processed = summary.processed,
                errors = summary.errors,
                "Batch finished with errors"
            );
        }

        summary
    }
}
