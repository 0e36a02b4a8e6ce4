//! Periodic pruning that keeps the pair store compact.
//!
//! Three passes: noise-floor counts, orphaned products, and stale rows.
//! Each pass works in bounded batches so a large store never pins memory
//! or holds long locks. Runs on its own schedule, independent of backfill.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::config::CleanupConfig;
use crate::domain::CleanupReport;
use crate::error::Result;
use crate::host::Catalog;
use crate::store::{PairStore, StatStore};

/// Pruning job over the pair and stats stores.
pub struct CleanupJob<S, C> {
    store: Arc<S>,
    catalog: Arc<C>,
}

impl<S, C> CleanupJob<S, C>
where
    S: PairStore + StatStore,
    C: Catalog,
{
    pub fn new(store: Arc<S>, catalog: Arc<C>) -> Self {
        Self { store, catalog }
    }

    /// Run one full cleanup pass.
    pub async fn run(&self, config: &CleanupConfig) -> Result<CleanupReport> {
        let low_count_deleted = self.store.delete_below_count(config.min_count as u64).await?;
        debug!(deleted = low_count_deleted, floor = config.min_count, "Low-count pairs pruned");

        let orphaned_deleted = self.prune_orphans(config.orphan_page_size).await?;

        let cutoff = Utc::now() - Duration::days(config.retention_days);
        let mut stale_deleted = 0u64;
        loop {
            let deleted = self
                .store
                .delete_stale_batch(cutoff, config.delete_batch_size)
                .await?;
            stale_deleted += deleted;
            if deleted < config.delete_batch_size as u64 {
                break;
            }
        }
        debug!(deleted = stale_deleted, retention_days = config.retention_days, "Stale pairs pruned");

        let report = CleanupReport {
            low_count_deleted,
            orphaned_deleted,
            stale_deleted,
        };
        info!(
            low_count = report.low_count_deleted,
            orphaned = report.orphaned_deleted,
            stale = report.stale_deleted,
            "Cleanup pass finished"
        );
        Ok(report)
    }

    /// Walk the distinct product ids referenced by the pair table in pages,
    /// bulk-check existence against the catalog, and delete rows (and stats)
    /// for products that no longer exist.
    async fn prune_orphans(&self, page_size: i64) -> Result<u64> {
        let mut deleted = 0u64;
        let mut cursor = None;

        loop {
            let page = self
                .store
                .referenced_products_page(cursor.as_ref(), page_size)
                .await?;
            if page.is_empty() {
                break;
            }

            let existing = self.catalog.existing(&page).await?;
            let missing: Vec<_> = page
                .iter()
                .filter(|id| !existing.contains(id))
                .cloned()
                .collect();

            if !missing.is_empty() {
                deleted += self.store.delete_pairs_referencing(&missing).await?;
                self.store.delete_stats_for(&missing).await?;
                debug!(missing = missing.len(), "Orphaned products pruned");
            }

            let full_page = page.len() as i64 == page_size;
            cursor = page.into_iter().last();
            if !full_page {
                break;
            }
        }

        Ok(deleted)
    }
}
