//! Command-line interface definitions.
//!
//! Defines the CLI structure using `clap`: recommendation queries, the
//! order-completion hook, and the operational backfill/cleanup surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Frequently-bought-together recommendation engine CLI
#[derive(Parser, Debug)]
#[command(name = "copurchase")]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "copurchase.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the copurchase CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show recommendations for a product
    Recommend(RecommendArgs),

    /// Fold one completed order into the stores (order-completion hook)
    Process(ProcessArgs),

    /// Replay historical orders into the stores
    #[command(subcommand)]
    Backfill(BackfillCommand),

    /// Prune low-signal, orphaned, and stale pair rows
    Cleanup,

    /// Load demo products and orders into the reference host tables
    Seed,
}

#[derive(clap::Args, Debug)]
pub struct RecommendArgs {
    /// Anchor product id
    pub product_id: String,

    /// Number of recommendations (defaults to the configured limit)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct ProcessArgs {
    /// Order id as known to the host
    pub order_id: i64,
}

/// Backfill subcommands.
#[derive(Subcommand, Debug)]
pub enum BackfillCommand {
    /// Run one resumable batch (invoke repeatedly, e.g. per scheduler tick)
    Run {
        /// Orders per batch (defaults to the configured batch size)
        #[arg(long)]
        batch_size: Option<i64>,
    },

    /// Show cursor, processed and remaining counts
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn recommend_parses_limit() {
        let cli = Cli::parse_from(["copurchase", "recommend", "sku-1", "--limit", "8"]);
        match cli.command {
            Commands::Recommend(args) => {
                assert_eq!(args.product_id, "sku-1");
                assert_eq!(args.limit, Some(8));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn backfill_run_parses_batch_size() {
        let cli = Cli::parse_from(["copurchase", "backfill", "run", "--batch-size", "10"]);
        match cli.command {
            Commands::Backfill(BackfillCommand::Run { batch_size }) => {
                assert_eq!(batch_size, Some(10));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
