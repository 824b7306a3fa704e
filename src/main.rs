use clap::{Parser, Subcommand};
use tracing::info;

use stubhub_scraper::client::VendorClient;
use stubhub_scraper::config::{Config, Credentials};
use stubhub_scraper::events::VenuePageSource;
use stubhub_scraper::inventory::fetch_listings;
use stubhub_scraper::logging;
use stubhub_scraper::pipeline::Orchestrator;
use stubhub_scraper::types::EventSource;

#[derive(Parser)]
#[command(name = "stubhub_scraper")]
#[command(about = "StubHub venue event and ticket inventory scraper")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover events for the configured venue
    Events,
    /// Fetch ticket listings for a single event
    Listings {
        /// StubHub event id
        #[arg(long)]
        event_id: String,
        /// Follow continuation pages up to the configured cap
        #[arg(long)]
        paginate: bool,
    },
    /// Discover events and fetch every inventory concurrently
    Run {
        /// Follow continuation pages up to the configured cap
        #[arg(long)]
        paginate: bool,
        /// Exchange credentials from the environment for an access token
        #[arg(long)]
        auth: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load_from(&cli.config)?;
    let client = VendorClient::new(&config)?;

    match cli.command {
        Commands::Events => {
            let source = VenuePageSource::new(client, &config);
            let events = source.discover_events().await?;

            println!("📅 Found {} events", events.len());
            for event in &events {
                println!("   {} | {} | {}", event.event_id, event.event_date, event.event_name);
            }
        }
        Commands::Listings { event_id, paginate } => {
            let fetch = fetch_listings(&client, &event_id, paginate, &config.stubhub).await?;

            println!(
                "🎟️  Fetched {} of {} listings in {} request(s){}",
                fetch.listings.len(),
                fetch.total_listings,
                fetch.requests,
                if fetch.truncated { " (truncated)" } else { "" }
            );
            println!("{}", serde_json::to_string_pretty(&fetch.listings)?);
        }
        Commands::Run { paginate, auth } => {
            // Authentication happens before any worker exists, so the
            // client identity is fixed for the whole run.
            let client = if auth {
                let credentials = Credentials::from_env()?;
                client.authenticate(&credentials).await?
            } else {
                client
            };

            let source = VenuePageSource::new(client.clone(), &config);
            let events = source.discover_events().await?;
            info!("Discovered {} events", events.len());

            let orchestrator = Orchestrator::new(client, config.clone());
            let (results, summary) = orchestrator.run_batch(events, paginate).await;

            println!("\n📊 Batch results:");
            println!("   Total events: {}", summary.total_events);
            println!("   Failed fetches: {}", summary.failed_count);
            println!("   Empty inventories: {}", summary.empty_count);
            println!("   Truncated inventories: {}", summary.truncated_count);
            println!("   Average fetch time: {:.2}s", summary.average_duration_secs);
            println!("   Success rate: {:.2}%", summary.success_rate_percent);

            let failures: Vec<_> = results.iter().filter(|r| !r.outcome.is_success()).collect();
            if !failures.is_empty() {
                println!("\n⚠️  Failed events:");
                for result in failures {
                    if let stubhub_scraper::types::FetchOutcome::Failed(reason) = &result.outcome {
                        println!("   - {}: {}", result.event_name, reason);
                    }
                }
            }
        }
    }

    Ok(())
}
