mod cache;
mod generate;
mod routes;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wander_core::DiskRouteStore;

#[derive(Parser)]
#[command(name = "wander")]
#[command(about = "Generate walking itineraries with an LLM", long_about = None)]
struct Cli {
    /// Directory for saved routes (default: $WANDER_ROUTES_DIR or ~/.wander/routes)
    #[arg(long, global = true)]
    routes_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an itinerary and print it as JSON
    Generate(generate::GenerateArgs),
    /// Manage saved routes
    Routes {
        #[command(subcommand)]
        command: routes::RoutesCommand,
    },
    /// Inspect or clear the AI response cache
    Cache {
        /// Cache directory (default: $WANDER_AI_CACHE_DIR or ~/.wander/ai-cache)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        #[command(subcommand)]
        command: cache::CacheCommand,
    },
}

/// Console logging on stderr so stdout stays valid JSON.
fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry();
    let cli = Cli::parse();

    let store = DiskRouteStore::new(cli.routes_dir.unwrap_or_else(DiskRouteStore::default_dir));

    match cli.command {
        Commands::Generate(args) => {
            let succeeded = generate::run(args, &store).await?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Commands::Routes { command } => {
            routes::run(command, &store)?;
        }
        Commands::Cache { cache_dir, command } => {
            cache::run(command, cache_dir)?;
        }
    }

    Ok(())
}
