//! Reference host adapter backed by the same SQLite database.
//!
//! Stands in for the host commerce platform: orders with a `processed`
//! flag, line items, and a catalog table. Production embedders implement
//! the port traits against their own platform instead.

use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::SqliteConnection;

use super::{Catalog, OrderSource};
use crate::db::model::{OrderItemRow, OrderRow, ProductRow};
use crate::db::schema::{order_items, orders, products};
use crate::db::DbPool;
use crate::domain::{CompletedOrder, LineItem, OrderId, ProductId};
use crate::error::{Result, StoreError};

const STATUS_COMPLETED: &str = "completed";

/// SQLite-backed order source and catalog.
#[derive(Clone)]
pub struct SqliteHost {
    pool: DbPool,
}

impl SqliteHost {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        self.pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()).into())
    }

    /// Seed one order with its line items. Test and demo aid.
    pub fn insert_order(&self, id: OrderId, status: &str, items: &[LineItem]) -> Result<()> {
        let mut conn = self.conn()?;

        let order_row = OrderRow {
            id: id.as_i64(),
            status: status.to_string(),
            processed: false,
            created_at: Utc::now().to_rfc3339(),
        };
        let item_rows: Vec<OrderItemRow> = items
            .iter()
            .map(|item| OrderItemRow {
                order_id: id.as_i64(),
                product_id: item.product_id.as_str().to_string(),
                parent_id: item.parent_id.as_ref().map(|p| p.as_str().to_string()),
            })
            .collect();

        conn.transaction(|conn| {
            diesel::insert_into(orders::table)
                .values(&order_row)
                .execute(conn)?;
            diesel::insert_into(order_items::table)
                .values(&item_rows)
                .execute(conn)?;
            Ok::<(), diesel::result::Error>(())
        })
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    /// Seed one catalog product. Test and demo aid.
    pub fn insert_product(&self, id: &ProductId, in_stock: bool, purchasable: bool) -> Result<()> {
        let mut conn = self.conn()?;

        let row = ProductRow {
            id: id.as_str().to_string(),
            in_stock,
            purchasable,
        };
        diesel::replace_into(products::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    /// Remove a product from the catalog. Test and demo aid.
    pub fn delete_product(&self, id: &ProductId) -> Result<()> {
        let mut conn = self.conn()?;

        diesel::delete(products::table.find(id.as_str()))
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

impl OrderSource for SqliteHost {
    async fn load_order(&self, id: OrderId) -> Result<Option<CompletedOrder>> {
        let mut conn = self.conn()?;

        let order: Option<OrderRow> = orders::table
            .find(id.as_i64())
            .first(&mut conn)
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let Some(order) = order else {
            return Ok(None);
        };
        if order.status != STATUS_COMPLETED {
            return Ok(None);
        }

        let item_rows: Vec<OrderItemRow> = order_items::table
            .filter(order_items::order_id.eq(id.as_i64()))
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let items = item_rows
            .into_iter()
            .map(|row| LineItem {
                product_id: ProductId::new(row.product_id),
                parent_id: row.parent_id.map(ProductId::new),
            })
            .collect();

        Ok(Some(CompletedOrder::new(id, items)))
    }

    async fn is_processed(&self, id: OrderId) -> Result<bool> {
        let mut conn = self.conn()?;

        let processed: Option<bool> = orders::table
            .find(id.as_i64())
            .select(orders::processed)
            .first(&mut conn)
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(processed.unwrap_or(false))
    }

    async fn mark_processed(&self, id: OrderId) -> Result<()> {
        let mut conn = self.conn()?;

        diesel::update(orders::table.find(id.as_i64()))
            .set(orders::processed.eq(true))
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn completed_orders_after(
        &self,
        cursor: OrderId,
        limit: i64,
        unprocessed_only: bool,
    ) -> Result<Vec<OrderId>> {
        let mut conn = self.conn()?;

        let mut query = orders::table
            .filter(orders::status.eq(STATUS_COMPLETED))
            .filter(orders::id.gt(cursor.as_i64()))
            .order(orders::id.asc())
            .limit(limit)
            .select(orders::id)
            .into_boxed();

        if unprocessed_only {
            query = query.filter(orders::processed.eq(false));
        }

        let ids: Vec<i64> = query
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(ids.into_iter().map(OrderId::new).collect())
    }

    async fn count_completed_after(&self, cursor: OrderId, unprocessed_only: bool) -> Result<u64> {
        let mut conn = self.conn()?;

        let base = orders::table
            .filter(orders::status.eq(STATUS_COMPLETED))
            .filter(orders::id.gt(cursor.as_i64()));

        let count: i64 = if unprocessed_only {
            base.filter(orders::processed.eq(false))
                .count()
                .get_result(&mut conn)
        } else {
            base.count().get_result(&mut conn)
        }
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(count.max(0) as u64)
    }
}

impl Catalog for SqliteHost {
    async fn existing(&self, ids: &[ProductId]) -> Result<Vec<ProductId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<&str> = ids.iter().map(ProductId::as_str).collect();
        let mut conn = self.conn()?;

        let found: Vec<String> = products::table
            .filter(products::id.eq_any(&raw))
            .select(products::id)
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(found.into_iter().map(ProductId::new).collect())
    }

    async fn is_purchasable(&self, id: &ProductId) -> Result<bool> {
        let mut conn = self.conn()?;

        let row: Option<ProductRow> = products::table
            .find(id.as_str())
            .first(&mut conn)
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.map(|p| p.in_stock && p.purchasable).unwrap_or(false))
    }
}
