//! Copurchase - "frequently bought together" recommendation engine.
//!
//! Incrementally builds a weighted product-pair graph from completed orders
//! and serves threshold-filtered, cache-fronted recommendations. Historical
//! order data can be replayed through resumable batch jobs.
//!
//! # Architecture
//!
//! Data flows one way: completed order → [`collector`] → pair/stats stores →
//! cache invalidation; storefront reads go cache-first through the
//! [`repository`].
//!
//! - **[`collector`]** - Folds one completed order into the stores exactly
//!   once, guarded by a durable per-order processed marker.
//! - **[`repository`]** - Ranked, threshold-filtered recommendation queries
//!   with stock and cart post-filters; fails open to "no recommendations".
//! - **[`backfill`]** - Cursor-paginated replay of historical orders,
//!   resumable across crashes and restarts.
//! - **[`cleanup`]** - Periodic pruning of low-signal, orphaned, and stale
//!   pair rows.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with validated settings
//! - [`domain`] - Identifiers, orders, counters, job reports
//! - [`error`] - Error types for the crate
//! - [`db`] - Diesel connection pool, migrations, schema
//! - [`store`] - Pair/stats/backfill-state persistence (SQLite)
//! - [`host`] - Ports onto the host commerce system + reference adapter
//! - [`cache`] - TTL'd, invalidation-aware recommendation cache
//! - [`cli`] - Operational command-line surface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use copurchase::cache::RecommendationCache;
//! use copurchase::config::Config;
//! use copurchase::db::{create_pool, run_migrations};
//! use copurchase::domain::ProductId;
//! use copurchase::host::{NoCart, SqliteHost};
//! use copurchase::repository::Repository;
//! use copurchase::store::SqliteStore;
//!
//! # async fn example() -> copurchase::error::Result<()> {
//! let config = Config::default();
//! let pool = create_pool(&config.database.url)?;
//! run_migrations(&pool)?;
//!
//! let repository = Repository::new(
//!     Arc::new(SqliteStore::new(pool.clone())),
//!     Arc::new(SqliteHost::new(pool)),
//!     Arc::new(RecommendationCache::new()),
//! );
//! let ids = repository
//!     .recommendations_for(&ProductId::new("sku-1"), 4, &config.recommendation, &NoCart)
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod backfill;
pub mod cache;
pub mod cleanup;
pub mod cli;
pub mod collector;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod host;
pub mod repository;
pub mod store;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
