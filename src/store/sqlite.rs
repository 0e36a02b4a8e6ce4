//! SQLite store implementation using Diesel.
//!
//! Counter writes use `INSERT ... ON CONFLICT ... DO UPDATE` so concurrent
//! order processing touching the same row is linearized by SQLite instead
//! of racing through application-level read-modify-write.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::SqliteConnection;

use super::{format_timestamp, BackfillStateStore, PairStore, StatStore};
use crate::db::model::{BackfillStateRow, PairRow, ProductStatRow};
use crate::db::schema::{backfill_state, product_pairs, product_stats};
use crate::db::{configure_sqlite_connection, DbPool};
use crate::domain::{BackfillState, OrderId, PairCounter, ProductId};
use crate::error::{Result, StoreError};

/// SQLite-backed store for pairs, stats, and backfill state.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        self.pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()).into())
    }

    fn write_conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        let mut conn = self.conn()?;
        if let Err(e) = configure_sqlite_connection(&mut conn) {
            tracing::warn!(error = %e, "Failed to configure SQLite connection");
        }
        Ok(conn)
    }

    fn upsert_direction(
        conn: &mut SqliteConnection,
        a: &ProductId,
        b: &ProductId,
        now: &str,
    ) -> std::result::Result<(), diesel::result::Error> {
        let row = PairRow {
            product_a: a.as_str().to_string(),
            product_b: b.as_str().to_string(),
            pair_count: 1,
            last_updated: now.to_string(),
        };

        diesel::insert_into(product_pairs::table)
            .values(&row)
            .on_conflict((product_pairs::product_a, product_pairs::product_b))
            .do_update()
            .set((
                product_pairs::pair_count.eq(product_pairs::pair_count + 1),
                product_pairs::last_updated.eq(now),
            ))
            .execute(conn)?;
        Ok(())
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Parse(e.to_string()).into())
    }

    fn pair_from_row(row: PairRow) -> Result<PairCounter> {
        Ok(PairCounter {
            product_a: ProductId::new(row.product_a),
            product_b: ProductId::new(row.product_b),
            count: row.pair_count.max(0) as u64,
            last_updated: Self::parse_timestamp(&row.last_updated)?,
        })
    }

    fn state_from_row(row: BackfillStateRow) -> Result<BackfillState> {
        Ok(BackfillState {
            last_processed_id: OrderId::new(row.last_processed_id),
            processed: row.processed.max(0) as u64,
            remaining: row.remaining.max(0) as u64,
            is_running: row.is_running,
            started_at: row
                .started_at
                .as_deref()
                .map(Self::parse_timestamp)
                .transpose()?,
            updated_at: Self::parse_timestamp(&row.updated_at)?,
        })
    }

    fn state_to_row(state: &BackfillState) -> BackfillStateRow {
        BackfillStateRow {
            id: 1,
            last_processed_id: state.last_processed_id.as_i64(),
            processed: state.processed as i64,
            remaining: state.remaining as i64,
            is_running: state.is_running,
            started_at: state.started_at.map(format_timestamp),
            updated_at: format_timestamp(state.updated_at),
        }
    }
}

impl PairStore for SqliteStore {
    async fn bump_pair(&self, a: &ProductId, b: &ProductId) -> Result<()> {
        let now = format_timestamp(Utc::now());
        let mut conn = self.write_conn()?;

        conn.transaction(|conn| {
            Self::upsert_direction(conn, a, b, &now)?;
            Self::upsert_direction(conn, b, a, &now)?;
            Ok::<(), diesel::result::Error>(())
        })
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn top_pairs_for(&self, anchor: &ProductId, limit: i64) -> Result<Vec<(ProductId, u64)>> {
        let mut conn = self.conn()?;

        let rows: Vec<(String, i64)> = product_pairs::table
            .filter(product_pairs::product_a.eq(anchor.as_str()))
            .order(product_pairs::pair_count.desc())
            .limit(limit)
            .select((product_pairs::product_b, product_pairs::pair_count))
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (ProductId::new(id), count.max(0) as u64))
            .collect())
    }

    async fn pair_count(&self, a: &ProductId, b: &ProductId) -> Result<Option<u64>> {
        Ok(self.get_pair(a, b).await?.map(|pair| pair.count))
    }

    async fn get_pair(&self, a: &ProductId, b: &ProductId) -> Result<Option<PairCounter>> {
        let mut conn = self.conn()?;

        let row: Option<PairRow> = product_pairs::table
            .find((a.as_str(), b.as_str()))
            .first(&mut conn)
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(Self::pair_from_row).transpose()
    }

    async fn delete_below_count(&self, floor: u64) -> Result<u64> {
        let mut conn = self.write_conn()?;

        let deleted =
            diesel::delete(product_pairs::table.filter(product_pairs::pair_count.lt(floor as i64)))
                .execute(&mut conn)
                .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(deleted as u64)
    }

    async fn referenced_products_page(
        &self,
        after: Option<&ProductId>,
        limit: i64,
    ) -> Result<Vec<ProductId>> {
        let mut conn = self.conn()?;

        let mut query = product_pairs::table
            .select(product_pairs::product_a)
            .distinct()
            .order(product_pairs::product_a.asc())
            .limit(limit)
            .into_boxed();

        if let Some(after) = after {
            query = query.filter(product_pairs::product_a.gt(after.as_str()));
        }

        let ids: Vec<String> = query
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(ids.into_iter().map(ProductId::new).collect())
    }

    async fn delete_pairs_referencing(&self, products: &[ProductId]) -> Result<u64> {
        if products.is_empty() {
            return Ok(0);
        }
        let ids: Vec<&str> = products.iter().map(ProductId::as_str).collect();
        let mut conn = self.write_conn()?;

        let deleted = diesel::delete(
            product_pairs::table.filter(
                product_pairs::product_a
                    .eq_any(&ids)
                    .or(product_pairs::product_b.eq_any(&ids)),
            ),
        )
        .execute(&mut conn)
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(deleted as u64)
    }

    async fn delete_stale_batch(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<u64> {
        let mut conn = self.write_conn()?;

        // Diesel has no DELETE ... LIMIT on SQLite; go through rowid instead.
        let deleted = diesel::sql_query(
            "DELETE FROM product_pairs WHERE rowid IN \
             (SELECT rowid FROM product_pairs WHERE last_updated < ? LIMIT ?)",
        )
        .bind::<diesel::sql_types::Text, _>(format_timestamp(cutoff))
        .bind::<diesel::sql_types::BigInt, _>(limit)
        .execute(&mut conn)
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(deleted as u64)
    }
}

impl StatStore for SqliteStore {
    async fn bump_order_count(&self, product: &ProductId) -> Result<()> {
        let now = format_timestamp(Utc::now());
        let mut conn = self.write_conn()?;

        let row = ProductStatRow {
            product_id: product.as_str().to_string(),
            order_count: 1,
            updated_at: now.clone(),
        };

        diesel::insert_into(product_stats::table)
            .values(&row)
            .on_conflict(product_stats::product_id)
            .do_update()
            .set((
                product_stats::order_count.eq(product_stats::order_count + 1),
                product_stats::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn order_count(&self, product: &ProductId) -> Result<u64> {
        let mut conn = self.conn()?;

        let count: Option<i64> = product_stats::table
            .find(product.as_str())
            .select(product_stats::order_count)
            .first(&mut conn)
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(count.unwrap_or(0).max(0) as u64)
    }

    async fn delete_stats_for(&self, products: &[ProductId]) -> Result<u64> {
        if products.is_empty() {
            return Ok(0);
        }
        let ids: Vec<&str> = products.iter().map(ProductId::as_str).collect();
        let mut conn = self.write_conn()?;

        let deleted =
            diesel::delete(product_stats::table.filter(product_stats::product_id.eq_any(&ids)))
                .execute(&mut conn)
                .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(deleted as u64)
    }
}

impl BackfillStateStore for SqliteStore {
    async fn load_state(&self) -> Result<Option<BackfillState>> {
        let mut conn = self.conn()?;

        let row: Option<BackfillStateRow> = backfill_state::table
            .find(1)
            .first(&mut conn)
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(Self::state_from_row).transpose()
    }

    async fn save_state(&self, state: &BackfillState) -> Result<()> {
        let row = Self::state_to_row(state);
        let mut conn = self.write_conn()?;

        diesel::replace_into(backfill_state::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
