//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{backfill_state, order_items, orders, product_pairs, product_stats, products};

/// Database row for a directed pair counter.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = product_pairs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PairRow {
    pub product_a: String,
    pub product_b: String,
    pub pair_count: i64,
    pub last_updated: String,
}

/// Database row for a per-product order count.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = product_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductStatRow {
    pub product_id: String,
    pub order_count: i64,
    pub updated_at: String,
}

/// Database row for the single-row backfill cursor state.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = backfill_state)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BackfillStateRow {
    pub id: i32,
    pub last_processed_id: i64,
    pub processed: i64,
    pub remaining: i64,
    pub is_running: bool,
    pub started_at: Option<String>,
    pub updated_at: String,
}

/// Database row for a host order (reference host adapter).
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderRow {
    pub id: i64,
    pub status: String,
    pub processed: bool,
    pub created_at: String,
}

/// Database row for a host order line item (reference host adapter).
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderItemRow {
    pub order_id: i64,
    pub product_id: String,
    pub parent_id: Option<String>,
}

/// Database row for a host catalog product (reference host adapter).
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductRow {
    pub id: String,
    pub in_stock: bool,
    pub purchasable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_row_is_insertable() {
        // Type check - if this compiles, the Insertable derive works
        let _row = PairRow {
            product_a: "a".to_string(),
            product_b: "b".to_string(),
            pair_count: 1,
            last_updated: "2026-01-01T00:00:00Z".to_string(),
        };
    }

    #[test]
    fn backfill_state_row_is_insertable() {
        let _row = BackfillStateRow {
            id: 1,
            last_processed_id: 0,
            processed: 0,
            remaining: 0,
            is_running: false,
            started_at: None,
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
    }
}
