//! CLI dispatch: wires the SQLite store, the reference host adapter, and
//! the engine components together and renders results.

mod command;

pub use command::{BackfillCommand, Cli, Commands};

use std::sync::Arc;

use anyhow::Context;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled};

use crate::backfill::BackfillJob;
use crate::cache::RecommendationCache;
use crate::cleanup::CleanupJob;
use crate::collector::Collector;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::domain::{LineItem, Outcome, OrderId, ProductId};
use crate::host::{NoCart, SqliteHost};
use crate::repository::Repository;
use crate::store::SqliteStore;

/// Execute a parsed CLI invocation.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let pool = create_pool(&config.database.url)
        .with_context(|| format!("opening database {}", config.database.url))?;
    run_migrations(&pool).context("running database migrations")?;

    let store = Arc::new(SqliteStore::new(pool.clone()));
    let host = Arc::new(SqliteHost::new(pool));
    let cache = Arc::new(RecommendationCache::new());

    match cli.command {
        Commands::Recommend(args) => {
            let repository = Repository::new(store, host, cache);
            let limit = args.limit.unwrap_or(config.recommendation.limit);
            let anchor = ProductId::new(args.product_id);
            let results = repository
                .recommendations_for(&anchor, limit, &config.recommendation, &NoCart)
                .await;

            if cli.json {
                println!("{}", serde_json::to_string(&results)?);
            } else if results.is_empty() {
                println!("{}", "No recommendations".yellow());
            } else {
                println!("Frequently bought with {}:", anchor.bold());
                for (rank, id) in results.iter().enumerate() {
                    println!("  {}. {}", rank + 1, id.green());
                }
            }
        }

        Commands::Process(args) => {
            let collector = Collector::new(store, host, cache);
            let outcome = collector.process(OrderId::new(args.order_id)).await?;

            if cli.json {
                println!("{}", serde_json::to_string(&outcome)?);
            } else {
                match outcome {
                    Outcome::Skipped => println!("{}", "Order already processed".yellow()),
                    Outcome::Processed { products, pairs } => {
                        println!(
                            "Processed: {products} distinct products, {pairs} pairs recorded"
                        );
                    }
                }
            }
        }

        Commands::Backfill(BackfillCommand::Run { batch_size }) => {
            let job = BackfillJob::new(store, host, cache);
            let batch_size = batch_size.unwrap_or(config.backfill.batch_size);
            let result = job.run_batch(batch_size).await?;

            if cli.json {
                println!("{}", serde_json::to_string(&result)?);
            } else {
                #[derive(Tabled)]
                struct Row {
                    processed: u64,
                    errors: u64,
                    cursor: String,
                    remaining: u64,
                    completed: bool,
                }
                let table = Table::new([Row {
                    processed: result.processed,
                    errors: result.errors,
                    cursor: result.cursor.to_string(),
                    remaining: result.remaining,
                    completed: result.completed,
                }]);
                println!("{table}");
                if !result.completed {
                    println!("{}", "Run again to continue".dimmed());
                }
            }
        }

        Commands::Backfill(BackfillCommand::Status) => {
            let job = BackfillJob::new(store, host, cache);
            let status = job.status().await?;

            if cli.json {
                println!("{}", serde_json::to_string(&status)?);
            } else {
                #[derive(Tabled)]
                struct Row {
                    processed: u64,
                    remaining: u64,
                    running: bool,
                    completed: bool,
                }
                let table = Table::new([Row {
                    processed: status.processed,
                    remaining: status.remaining,
                    running: status.is_running,
                    completed: status.completed,
                }]);
                println!("{table}");
            }
        }

        Commands::Cleanup => {
            let job = CleanupJob::new(store, host);
            let report = job.run(&config.cleanup).await?;

            if cli.json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!(
                    "Cleanup removed {} rows (low-count: {}, orphaned: {}, stale: {})",
                    report.total(),
                    report.low_count_deleted,
                    report.orphaned_deleted,
                    report.stale_deleted
                );
            }
        }

        Commands::Seed => {
            seed_demo_data(&host).context("seeding demo data (already seeded?)")?;
            println!("{}", "Seeded demo catalog and orders".green());
            println!("Try: copurchase backfill run && copurchase recommend coffee");
        }
    }

    Ok(())
}

/// Demo catalog and order history for trying the engine out.
fn seed_demo_data(host: &SqliteHost) -> crate::error::Result<()> {
    for product in ["coffee", "filter", "grinder", "mug", "kettle"] {
        host.insert_product(&ProductId::new(product), true, true)?;
    }

    let orders: &[(i64, &[&str])] = &[
        (1, &["coffee", "filter"]),
        (2, &["coffee", "filter", "mug"]),
        (3, &["coffee", "grinder"]),
        (4, &["coffee", "filter"]),
        (5, &["kettle", "mug"]),
        (6, &["coffee", "mug"]),
        (7, &["grinder", "coffee"]),
        (8, &["kettle"]),
    ];
    for (id, products) in orders {
        let items: Vec<LineItem> = products.iter().map(|p| LineItem::new(*p)).collect();
        host.insert_order(OrderId::new(*id), "completed", &items)?;
    }

    Ok(())
}
