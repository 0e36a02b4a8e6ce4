//! Cleanup job: noise floor, orphaned products, and stale retention.

mod harness;

use copurchase::config::CleanupConfig;
use copurchase::domain::{OrderId, ProductId};
use copurchase::store::{PairStore, StatStore};
use diesel::prelude::*;

use harness::Engine;

fn config() -> CleanupConfig {
    CleanupConfig::default()
}

/// A pair exactly one below the floor is deleted; at the floor it survives.
#[tokio::test]
async fn noise_floor_boundary() {
    let engine = Engine::create("cleanup-floor");
    engine.seed_order(1, &["a", "b"]);
    engine.seed_order(2, &["a", "c"]);
    engine.seed_order(3, &["a", "c"]);

    let collector = engine.collector();
    for id in 1..=3 {
        collector.process(OrderId::new(id)).await.unwrap();
    }

    // floor 2: {a,b} sits at 1, {a,c} at exactly 2.
    let report = engine.cleanup().run(&config()).await.unwrap();
    assert_eq!(report.low_count_deleted, 2, "both directions of {{a,b}}");

    let a = ProductId::new("a");
    assert_eq!(engine.store.pair_count(&a, &ProductId::new("b")).await.unwrap(), None);
    assert_eq!(
        engine.store.pair_count(&a, &ProductId::new("c")).await.unwrap(),
        Some(2)
    );
}

#[tokio::test]
async fn orphaned_pairs_and_stats_are_removed() {
    let engine = Engine::create("cleanup-orphans");
    engine.seed_order(1, &["a", "b"]);
    engine.seed_order(2, &["a", "b"]);
    engine.seed_order(3, &["a", "gone"]);
    engine.seed_order(4, &["a", "gone"]);

    let collector = engine.collector();
    for id in 1..=4 {
        collector.process(OrderId::new(id)).await.unwrap();
    }

    // The product disappears from the catalog after its orders were folded.
    engine.host.delete_product(&ProductId::new("gone")).unwrap();

    let report = engine.cleanup().run(&config()).await.unwrap();
    assert_eq!(report.orphaned_deleted, 2);

    let a = ProductId::new("a");
    let gone = ProductId::new("gone");
    assert_eq!(engine.store.pair_count(&a, &gone).await.unwrap(), None);
    assert_eq!(engine.store.pair_count(&gone, &a).await.unwrap(), None);
    assert_eq!(engine.store.order_count(&gone).await.unwrap(), 0);
    // The surviving pair is untouched.
    assert_eq!(
        engine.store.pair_count(&a, &ProductId::new("b")).await.unwrap(),
        Some(2)
    );
}

#[tokio::test]
async fn orphan_scan_pages_through_the_product_universe() {
    let engine = Engine::create("cleanup-orphan-pages");
    for id in 1..=2 {
        engine.seed_order(id, &["a", "b", "c", "d", "e"]);
    }
    let collector = engine.collector();
    collector.process(OrderId::new(1)).await.unwrap();
    collector.process(OrderId::new(2)).await.unwrap();

    engine.host.delete_product(&ProductId::new("c")).unwrap();

    let mut small_pages = config();
    small_pages.orphan_page_size = 2;
    let report = engine.cleanup().run(&small_pages).await.unwrap();

    // c paired with 4 others, both directions each.
    assert_eq!(report.orphaned_deleted, 8);
    assert_eq!(
        engine
            .store
            .pair_count(&ProductId::new("a"), &ProductId::new("c"))
            .await
            .unwrap(),
        None
    );
    assert_eq!(
        engine
            .store
            .pair_count(&ProductId::new("a"), &ProductId::new("b"))
            .await
            .unwrap(),
        Some(2)
    );
}

#[tokio::test]
async fn stale_pairs_are_pruned_in_batches() {
    let engine = Engine::create("cleanup-stale");
    engine.seed_order(1, &["old1", "old2"]);
    engine.seed_order(2, &["old1", "old2"]);
    engine.seed_order(3, &["new1", "new2"]);
    engine.seed_order(4, &["new1", "new2"]);

    let collector = engine.collector();
    for id in 1..=4 {
        collector.process(OrderId::new(id)).await.unwrap();
    }

    // Age the old pair past the retention window.
    {
        use copurchase::db::schema::product_pairs;
        let mut conn = engine.db.pool().get().unwrap();
        let two_years_ago = (chrono::Utc::now() - chrono::Duration::days(730)).to_rfc3339();
        diesel::update(
            product_pairs::table.filter(product_pairs::product_a.like("old%")),
        )
        .set(product_pairs::last_updated.eq(two_years_ago))
        .execute(&mut conn)
        .unwrap();
    }

    let mut small_batches = config();
    small_batches.delete_batch_size = 1;
    let report = engine.cleanup().run(&small_batches).await.unwrap();

    assert_eq!(report.stale_deleted, 2);
    assert_eq!(
        engine
            .store
            .pair_count(&ProductId::new("old1"), &ProductId::new("old2"))
            .await
            .unwrap(),
        None
    );
    assert_eq!(
        engine
            .store
            .pair_count(&ProductId::new("new1"), &ProductId::new("new2"))
            .await
            .unwrap(),
        Some(2)
    );
}

#[tokio::test]
async fn empty_store_cleanup_reports_zero() {
    let engine = Engine::create("cleanup-empty");
    let report = engine.cleanup().run(&config()).await.unwrap();
    assert_eq!(report.total(), 0);
}
