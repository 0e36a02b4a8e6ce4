//! Turns raw pair counters into a ranked, filtered recommendation list.
//!
//! Query order: cache, then store (top candidates with over-fetch), then the
//! relative threshold, then stock/cart post-filters. The storefront path
//! fails open: any store error degrades to an empty list, never an error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{ListKey, RecommendationCache};
use crate::config::RecommendationSettings;
use crate::domain::ProductId;
use crate::error::Result;
use crate::host::{Cart, Catalog};
use crate::store::{PairStore, StatStore};

/// Candidates fetched per requested result, leaving room for post-filtering.
const OVER_FETCH_FACTOR: usize = 2;

/// Cache-aware recommendation queries.
pub struct Repository<S, C> {
    store: Arc<S>,
    catalog: Arc<C>,
    cache: Arc<RecommendationCache>,
}

impl<S, C> Repository<S, C>
where
    S: PairStore + StatStore,
    C: Catalog,
{
    pub fn new(store: Arc<S>, catalog: Arc<C>, cache: Arc<RecommendationCache>) -> Self {
        Self {
            store,
            catalog,
            cache,
        }
    }

    /// Products recommended alongside `anchor`, best first.
    ///
    /// Never fails: store or catalog errors are logged and degrade to an
    /// empty list, so the storefront renders without recommendations
    /// instead of erroring.
    pub async fn recommendations_for<K: Cart>(
        &self,
        anchor: &ProductId,
        limit: usize,
        settings: &RecommendationSettings,
        cart: &K,
    ) -> Vec<ProductId> {
        match self.compute(anchor, limit, settings, cart).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(anchor = %anchor, error = %e, "Recommendation query failed, returning none");
                Vec::new()
            }
        }
    }

    async fn compute<K: Cart>(
        &self,
        anchor: &ProductId,
        limit: usize,
        settings: &RecommendationSettings,
        cart: &K,
    ) -> Result<Vec<ProductId>> {
        let key = ListKey::new(anchor.clone(), limit, settings.fingerprint());
        if let Some(ids) = self.cache.get_list(&key) {
            debug!(anchor = %anchor, hits = ids.len(), "Recommendation cache hit");
            return Ok(ids);
        }

        let anchor_orders = self.anchor_order_count(anchor, settings).await?;
        if anchor_orders == 0 {
            // No denominator means the threshold cannot be evaluated; an
            // unfiltered list would be worse than none. Backfill repairs the
            // missing stats row.
            warn!(anchor = %anchor, "No order count for anchor, returning none");
            let ttl = Duration::from_secs(settings.cache_ttl_secs);
            self.cache.put_list(key, Vec::new(), ttl);
            return Ok(Vec::new());
        }

        let min_count = min_pair_count(settings.threshold_percent, anchor_orders);

        let fetch = (limit * OVER_FETCH_FACTOR) as i64;
        let candidates = self.store.top_pairs_for(anchor, fetch).await?;

        let in_cart = if settings.hide_if_in_cart {
            cart.contents().await?
        } else {
            Vec::new()
        };

        let mut results = Vec::with_capacity(limit);
        for (candidate, count) in candidates {
            // Candidates arrive count-descending; the first one under the
            // threshold ends the scan.
            if count < min_count {
                break;
            }
            if in_cart.contains(&candidate) {
                continue;
            }
            if !self.catalog.is_purchasable(&candidate).await? {
                continue;
            }
            results.push(candidate);
            if results.len() == limit {
                break;
            }
        }

        debug!(
            anchor = %anchor,
            anchor_orders,
            min_count,
            results = results.len(),
            "Recommendations computed"
        );

        let ttl = Duration::from_secs(settings.cache_ttl_secs);
        self.cache.put_list(key, results.clone(), ttl);

        Ok(results)
    }

    /// Authoritative threshold denominator, behind the coarser long-TTL
    /// cache since it changes slowly and moves with every order.
    async fn anchor_order_count(
        &self,
        anchor: &ProductId,
        settings: &RecommendationSettings,
    ) -> Result<u64> {
        if let Some(count) = self.cache.get_count(anchor) {
            return Ok(count);
        }
        let count = self.store.order_count(anchor).await?;
        self.cache.put_count(
            anchor.clone(),
            count,
            Duration::from_secs(settings.stats_cache_ttl_secs),
        );
        Ok(count)
    }
}

/// Minimum pair count a candidate needs:
/// `ceil(threshold_percent / 100 * orders_containing_anchor)`, floored at 1
/// since counters below 1 never exist.
fn min_pair_count(threshold_percent: f64, anchor_orders: u64) -> u64 {
    let raw = (threshold_percent / 100.0 * anchor_orders as f64).ceil() as u64;
    raw.max(1)
}
