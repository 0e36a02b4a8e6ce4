//! Counter rows as read back from the relationship and stats stores.

use chrono::{DateTime, Utc};

use super::ids::ProductId;

/// "Product A and product B were purchased together in `count` orders."
///
/// Stored directed: the unordered pair {A,B} exists as (A,B) and (B,A) with
/// equal counts, so anchor lookups never need direction normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairCounter {
    pub product_a: ProductId,
    pub product_b: ProductId,
    pub count: u64,
    pub last_updated: DateTime<Utc>,
}

/// "Product P appeared in `order_count` distinct completed orders."
///
/// The authoritative denominator for percentage thresholding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductStat {
    pub product_id: ProductId,
    pub order_count: u64,
    pub updated_at: DateTime<Utc>,
}
