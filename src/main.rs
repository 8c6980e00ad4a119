use clap::{Parser, Subcommand};
use festival_scraper::config::Config;
use festival_scraper::fetch::HttpFetcher;
use festival_scraper::logging;
use festival_scraper::pipeline::Pipeline;
use festival_scraper::storage::Storage;
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(name = "festival_scraper")]
#[command(about = "Lucerne Festival event data scraper")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full ingestion pass
    Run {
        /// Write the collated snapshot to disk instead of the database
        #[arg(long)]
        dry_run: bool,
        /// Drop and recreate all tables before ingesting
        #[arg(long)]
        reset: bool,
    },
    /// Drop and recreate all tables
    Reset,
}

#[cfg(feature = "db")]
async fn create_storage() -> Result<Arc<dyn Storage>, Box<dyn std::error::Error>> {
    use festival_scraper::storage::DatabaseStorage;
    let storage: Arc<dyn Storage> = Arc::new(DatabaseStorage::connect().await?);
    Ok(storage)
}

#[cfg(not(feature = "db"))]
async fn create_storage() -> Result<Arc<dyn Storage>, Box<dyn std::error::Error>> {
    use festival_scraper::storage::InMemoryStorage;
    println!("⚠️  Built without the `db` feature; using in-memory storage");
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    Ok(storage)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;
    let storage = create_storage().await?;

    match cli.command {
        Commands::Run { dry_run, reset } => {
            if reset {
                storage.reset().await?;
                println!("🗑️  Reset database");
            }

            println!("🚀 Starting ingestion run...");
            let pipeline = Pipeline::new(Arc::new(HttpFetcher::new()), storage, config);
            let result = pipeline.run(dry_run).await?;

            println!("\n📊 Run results:");
            println!("   Discovered events: {}", result.discovered_events);
            println!("   Extracted events: {}", result.extracted_events);
            println!("   Venues: {}", result.venues);
            println!("   Composers: {}", result.composers);
            println!("   Pieces: {}", result.pieces);
            println!("   Bookings: {}", result.bookings);
            println!("   Tickets reconciled: {}", result.tickets_reconciled);
            if let Some(snapshot_file) = &result.snapshot_file {
                println!("   Snapshot file: {snapshot_file}");
            }

            if !result.errors.is_empty() {
                warn!("{} events failed extraction", result.errors.len());
                println!("\n⚠️  Events skipped due to errors:");
                for error in &result.errors {
                    println!("   - {error}");
                }
            }
        }
        Commands::Reset => {
            storage.reset().await?;
            println!("🗑️  Reset database");
        }
    }

    Ok(())
}
