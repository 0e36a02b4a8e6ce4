//! Backfill job: batching, resumability, and poison-record handling.

mod harness;

use std::sync::Arc;

use copurchase::backfill::BackfillJob;
use copurchase::cache::RecommendationCache;
use copurchase::domain::{OrderId, ProductId};
use copurchase::store::{PairStore, StatStore};
use copurchase::testkit::MemoryHost;

use harness::Engine;

#[tokio::test]
async fn empty_store_completes_immediately() {
    let engine = Engine::create("backfill-empty");
    let job = engine.backfill();

    let result = job.run_batch(10).await.unwrap();
    assert!(result.completed);
    assert_eq!(result.processed, 0);
    assert_eq!(result.remaining, 0);

    let status = job.status().await.unwrap();
    assert!(status.completed);
    assert!(!status.is_running);
}

#[tokio::test]
async fn all_orders_are_processed_across_batches() {
    let engine = Engine::create("backfill-batches");
    for id in 1..=10 {
        engine.seed_order(id, &["a", "b"]);
    }

    let job = engine.backfill();
    let mut total = 0;
    let mut batches = 0;
    loop {
        let result = job.run_batch(3).await.unwrap();
        total += result.processed;
        batches += 1;
        if result.completed {
            break;
        }
        assert!(batches < 20, "job failed to terminate");
    }

    assert_eq!(total, 10);
    // Each order folded exactly once: no gaps, no duplicates.
    assert_eq!(
        engine
            .store
            .pair_count(&ProductId::new("a"), &ProductId::new("b"))
            .await
            .unwrap(),
        Some(10)
    );
    assert_eq!(
        engine.store.order_count(&ProductId::new("a")).await.unwrap(),
        10
    );
}

/// Dropping the job between batches simulates a crash: the persisted cursor
/// lets a new instance finish the remaining orders exactly once each.
#[tokio::test]
async fn resumes_from_persisted_cursor_after_restart() {
    let engine = Engine::create("backfill-resume");
    for id in 1..=9 {
        engine.seed_order(id, &["a", "b"]);
    }

    let first = engine.backfill();
    let batch = first.run_batch(4).await.unwrap();
    assert_eq!(batch.processed, 4);
    assert_eq!(batch.cursor, OrderId::new(4));
    assert!(!batch.completed);
    drop(first);

    let second = engine.backfill();
    let status = second.status().await.unwrap();
    assert_eq!(status.processed, 4);
    assert_eq!(status.remaining, 5);

    let mut total = batch.processed;
    loop {
        let result = second.run_batch(4).await.unwrap();
        total += result.processed;
        if result.completed {
            break;
        }
    }

    assert_eq!(total, 9);
    assert_eq!(
        engine
            .store
            .pair_count(&ProductId::new("a"), &ProductId::new("b"))
            .await
            .unwrap(),
        Some(9),
        "restart must not re-count the first batch"
    );
}

#[tokio::test]
async fn already_processed_orders_are_not_selected() {
    let engine = Engine::create("backfill-preprocessed");
    for id in 1..=5 {
        engine.seed_order(id, &["a", "b"]);
    }
    // Orders 1 and 2 came through the live completion hook already.
    let collector = engine.collector();
    collector.process(OrderId::new(1)).await.unwrap();
    collector.process(OrderId::new(2)).await.unwrap();

    let job = engine.backfill();
    let result = job.run_batch(10).await.unwrap();

    assert_eq!(result.processed, 3);
    assert!(result.completed);
    assert_eq!(
        engine
            .store
            .pair_count(&ProductId::new("a"), &ProductId::new("b"))
            .await
            .unwrap(),
        Some(5)
    );
}

/// A poison order is tallied as an error and the cursor advances past it,
/// so the job still runs to completion.
#[tokio::test]
async fn poison_order_cannot_stall_the_job() {
    let engine = Engine::create("backfill-poison");
    let host = Arc::new(MemoryHost::new());
    host.add_completed_order(1, &["a", "b"]);
    host.add_poison_order(2);
    host.add_completed_order(3, &["a", "b"]);

    let job = BackfillJob::new(
        engine.store.clone(),
        host.clone(),
        Arc::new(RecommendationCache::new()),
    );

    let result = job.run_batch(2).await.unwrap();
    assert_eq!(result.processed, 1);
    assert_eq!(result.errors, 1);
    assert_eq!(result.cursor, OrderId::new(2), "cursor moved past the poison order");

    let result = job.run_batch(2).await.unwrap();
    assert!(result.completed);

    assert_eq!(
        engine
            .store
            .pair_count(&ProductId::new("a"), &ProductId::new("b"))
            .await
            .unwrap(),
        Some(2)
    );

    let status = job.status().await.unwrap();
    assert_eq!(status.processed, 2);
    assert!(status.completed);
}

#[tokio::test]
async fn completed_job_restarts_in_repair_mode_for_new_orders() {
    let engine = Engine::create("backfill-repair");
    engine.seed_order(1, &["a", "b"]);

    let job = engine.backfill();
    loop {
        if job.run_batch(5).await.unwrap().completed {
            break;
        }
    }
    assert!(job.status().await.unwrap().completed);

    // New history appears after completion (e.g. an import).
    engine.seed_order(2, &["a", "b"]);

    let result = job.run_batch(5).await.unwrap();
    assert_eq!(result.processed, 1);
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
async fn status_before_any_run_is_not_started() {
    let engine = Engine::create("backfill-notstarted");
    let job = engine.backfill();

    let status = job.status().await.unwrap();
    assert!(!status.is_running);
    assert!(!status.completed);
    assert_eq!(status.processed, 0);
}
