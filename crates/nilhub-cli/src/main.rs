use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "nilhub-cli")]
#[command(about = "NILHub social metrics command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every social profile with a non-empty handle.
    Scrape,
    /// Scrape the social profiles of a single athlete.
    ScrapeAthlete {
        /// Athlete UUID.
        athlete_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = nilhub_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let pool_config = nilhub_db::PoolConfig::from_app_config(&config);
    let pool = nilhub_db::connect_pool(&config.database_url, pool_config).await?;
    nilhub_db::run_migrations(&pool).await?;

    let store = Arc::new(nilhub_db::PgMetricsStore::new(pool));
    let orchestrator = nilhub_scraper::default_orchestrator(store, &config);

    let summary = match cli.command {
        Commands::Scrape => orchestrator.scrape_all_profiles().await,
        Commands::ScrapeAthlete { athlete_id } => {
            orchestrator.scrape_profiles_for_athlete(athlete_id).await
        }
    };
    orchestrator.cleanup().await;

    println!(
        "scrape run complete: {} succeeded, {} failed",
        summary.success, summary.failed
    );
    Ok(())
}
