//! Shared fixtures for integration tests.
#![allow(dead_code)]

pub mod temp_db;

use std::sync::Arc;

use copurchase::backfill::BackfillJob;
use copurchase::cache::RecommendationCache;
use copurchase::cleanup::CleanupJob;
use copurchase::collector::Collector;
use copurchase::domain::{LineItem, OrderId, ProductId};
use copurchase::host::SqliteHost;
use copurchase::store::SqliteStore;

use temp_db::TempDb;

/// A full engine wired against one temporary SQLite database.
pub struct Engine {
    pub db: TempDb,
    pub store: Arc<SqliteStore>,
    pub host: Arc<SqliteHost>,
    pub cache: Arc<RecommendationCache>,
}

impl Engine {
    pub fn create(name: &str) -> Self {
        let db = TempDb::create(name);
        let store = Arc::new(SqliteStore::new(db.pool().clone()));
        let host = Arc::new(SqliteHost::new(db.pool().clone()));
        let cache = Arc::new(RecommendationCache::new());
        Self {
            db,
            store,
            host,
            cache,
        }
    }

    pub fn collector(&self) -> Collector<SqliteStore, SqliteHost> {
        Collector::new(self.store.clone(), self.host.clone(), self.cache.clone())
    }

    pub fn backfill(&self) -> BackfillJob<SqliteStore, SqliteHost> {
        BackfillJob::new(self.store.clone(), self.host.clone(), self.cache.clone())
    }

    pub fn cleanup(&self) -> CleanupJob<SqliteStore, SqliteHost> {
        CleanupJob::new(self.store.clone(), self.host.clone())
    }

    /// Seed a completed order and make sure every product is purchasable.
    pub fn seed_order(&self, id: i64, products: &[&str]) {
        for product in products {
            self.host
                .insert_product(&ProductId::new(*product), true, true)
                .expect("insert product");
        }
        let items: Vec<LineItem> = products.iter().map(|p| LineItem::new(*p)).collect();
        self.host
            .insert_order(OrderId::new(id), "completed", &items)
            .expect("insert order");
    }
}
