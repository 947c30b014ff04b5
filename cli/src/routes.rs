use anyhow::{bail, Context, Result};
use clap::Subcommand;
use wander_core::{DiskRouteStore, RouteStore};

#[derive(Subcommand)]
pub enum RoutesCommand {
    /// List saved route keys
    List,
    /// Print a saved itinerary
    Show { key: String },
    /// Delete a saved route
    Delete { key: String },
}

pub fn run(command: RoutesCommand, store: &DiskRouteStore) -> Result<()> {
    match command {
        RoutesCommand::List => {
            let keys = store.list().context("Failed to list routes")?;
            if keys.is_empty() {
                eprintln!("No saved routes in {}", store.routes_dir().display());
            }
            for key in keys {
                println!("{}", key);
            }
        }
        RoutesCommand::Show { key } => {
            let Some(itinerary) = store
                .load_itinerary(&key)
                .with_context(|| format!("Failed to load route {:?}", key))?
            else {
                bail!("No route saved under {:?}", key);
            };
            println!("{}", serde_json::to_string_pretty(&itinerary)?);
        }
        RoutesCommand::Delete { key } => {
            if !store
                .delete(&key)
                .with_context(|| format!("Failed to delete route {:?}", key))?
            {
                bail!("No route saved under {:?}", key);
            }
            println!("Deleted {}", key);
        }
    }

    Ok(())
}
