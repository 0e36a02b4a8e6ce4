//! Ports onto the host commerce system.
//!
//! The engine never owns orders, catalog entries, or carts; it consumes
//! them through these traits. A reference SQLite adapter is provided so
//! the binary works end-to-end, and `testkit` ships in-memory fakes.

mod sqlite;

pub use sqlite::SqliteHost;

use std::future::Future;

use crate::domain::{CompletedOrder, OrderId, ProductId};
use crate::error::Result;

/// Completed-order access, including the durable processed marker.
///
/// The marker lives on the order entity and never expires; it is what makes
/// re-processing an order a no-op instead of a re-increment.
pub trait OrderSource: Send + Sync {
    /// Resolve a completed order to its line items. `None` when the order
    /// does not exist or is not completed.
    fn load_order(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<CompletedOrder>>> + Send;

    fn is_processed(&self, id: OrderId) -> impl Future<Output = Result<bool>> + Send;

    fn mark_processed(&self, id: OrderId) -> impl Future<Output = Result<()>> + Send;

    /// Ids of completed orders strictly above `cursor`, ascending, up to
    /// `limit`; optionally restricted to orders without a processed marker.
    fn completed_orders_after(
        &self,
        cursor: OrderId,
        limit: i64,
        unprocessed_only: bool,
    ) -> impl Future<Output = Result<Vec<OrderId>>> + Send;

    /// Count of completed orders strictly above `cursor`. Expensive on large
    /// stores; the backfill job calls it once at start, not per batch.
    fn count_completed_after(
        &self,
        cursor: OrderId,
        unprocessed_only: bool,
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// Catalog lookups for existence, stock, and purchasability.
pub trait Catalog: Send + Sync {
    /// Which of the given products currently exist in the catalog.
    fn existing(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<ProductId>>> + Send;

    /// Whether the product exists, is in stock, and is purchasable.
    fn is_purchasable(&self, id: &ProductId) -> impl Future<Output = Result<bool>> + Send;
}

/// The requester's current cart contents.
pub trait Cart: Send + Sync {
    fn contents(&self) -> impl Future<Output = Result<Vec<ProductId>>> + Send;
}

/// Cart implementation for contexts with no shopper session (CLI, cron).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCart;

impl Cart for NoCart {
    async fn contents(&self) -> Result<Vec<ProductId>> {
        Ok(Vec::new())
    }
}
