use clap::Parser;
use copurchase::cli::{self, Cli};
use copurchase::config::Config;
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();

    if let Err(e) = cli::run(cli, config).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
