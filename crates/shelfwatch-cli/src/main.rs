mod geocode;
mod ingest;
mod report;
mod seed;

use clap::{Parser, Subcommand};

use shelfwatch_db::PoolConfig;

#[derive(Debug, Parser)]
#[command(name = "shelfwatch-cli")]
#[command(about = "shelfwatch grocery price ingestion pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape all configured retailer profiles and reconcile the catalog
    Ingest {
        /// Restrict ingestion to a specific retailer (by profile name)
        #[arg(long)]
        retailer: Option<String>,

        /// Preview which profiles would be ingested without scraping or writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Assign synthetic offers to configured competitor retailers
    SeedCompetitors {
        /// How many products to sample per competitor
        #[arg(long, default_value_t = 40)]
        offers_per_competitor: i64,
    },
    /// Backfill coordinates for retailer addresses that lack them
    Geocode,
    /// Show recent ingestion runs and their per-retailer outcomes
    Runs {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shelfwatch_core::load_app_config_from_env()?;
    init_tracing(&config)?;

    let cli = Cli::parse();

    let pool =
        shelfwatch_db::connect_pool(&config.database_url, PoolConfig::from_app_config(&config))
            .await?;
    shelfwatch_db::ping(&pool).await?;

    match cli.command {
        Commands::Ingest { retailer, dry_run } => {
            ingest::run_ingest(&pool, &config, retailer.as_deref(), dry_run).await
        }
        Commands::SeedCompetitors {
            offers_per_competitor,
        } => seed::run_seed(&pool, &config, offers_per_competitor).await,
        Commands::Geocode => geocode::run_geocode(&pool, &config).await,
        Commands::Runs { limit } => report::run_report(&pool, limit).await,
        Commands::Migrate => {
            let applied = shelfwatch_db::run_migrations(&pool).await?;
            println!("applied {applied} migrations");
            Ok(())
        }
    }
}

/// Installs the operational log stream (stderr) and, when configured, a
/// secondary file sink that retains the same records for later inspection.
fn init_tracing(config: &shelfwatch_core::AppConfig) -> anyhow::Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    if let Some(path) = &config.log_path {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        registry
            .with(fmt::layer().with_ansi(false).with_writer(std::sync::Arc::new(file)))
            .init();
    } else {
        registry.init();
    }

    Ok(())
}
