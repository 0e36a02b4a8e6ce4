//! Persistence layer for the pair graph, product stats, and backfill state.
//!
//! All counter writers go through these traits; the atomic upsert methods
//! are the only way counts change outside of cleanup, so concurrent order
//! processing never loses an increment to a read-modify-write race.

mod sqlite;

pub use sqlite::SqliteStore;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{BackfillState, PairCounter, ProductId};
use crate::error::Result;

/// Storage operations for directed pair counters.
pub trait PairStore: Send + Sync {
    /// Atomically insert-or-increment both directions of the pair {a,b}.
    fn bump_pair(
        &self,
        a: &ProductId,
        b: &ProductId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Top co-purchase candidates for an anchor, by count descending.
    /// Returns the "other" product for each pair row.
    fn top_pairs_for(
        &self,
        anchor: &ProductId,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<(ProductId, u64)>>> + Send;

    /// Current count for the directed row (a, b), if present.
    fn pair_count(
        &self,
        a: &ProductId,
        b: &ProductId,
    ) -> impl Future<Output = Result<Option<u64>>> + Send;

    /// Full directed row (a, b), if present.
    fn get_pair(
        &self,
        a: &ProductId,
        b: &ProductId,
    ) -> impl Future<Output = Result<Option<PairCounter>>> + Send;

    /// Delete rows below the noise floor. Returns count deleted.
    fn delete_below_count(&self, floor: u64) -> impl Future<Output = Result<u64>> + Send;

    /// Page of distinct product ids referenced by the pair table, ordered
    /// ascending, strictly after `after`.
    fn referenced_products_page(
        &self,
        after: Option<&ProductId>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ProductId>>> + Send;

    /// Delete every row referencing any of the given products (either
    /// direction). Returns count deleted.
    fn delete_pairs_referencing(
        &self,
        products: &[ProductId],
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Delete up to `limit` rows last updated before `cutoff`. Returns count
    /// deleted; callers loop until a batch comes back short.
    fn delete_stale_batch(
        &self,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// Storage operations for per-product order counts.
pub trait StatStore: Send + Sync {
    /// Atomically insert-or-increment the order count for a product.
    fn bump_order_count(&self, product: &ProductId) -> impl Future<Output = Result<()>> + Send;

    /// Orders containing the product; 0 when unknown.
    fn order_count(&self, product: &ProductId) -> impl Future<Output = Result<u64>> + Send;

    /// Delete stats rows for the given products. Returns count deleted.
    fn delete_stats_for(
        &self,
        products: &[ProductId],
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// Storage for the single-row resumable backfill cursor.
pub trait BackfillStateStore: Send + Sync {
    fn load_state(&self) -> impl Future<Output = Result<Option<BackfillState>>> + Send;

    fn save_state(&self, state: &BackfillState) -> impl Future<Output = Result<()>> + Send;
}

/// Format a timestamp the way the store persists it.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}
