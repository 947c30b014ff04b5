use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use wander_core::ai::{AiCache, AiConfig};

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Show how many provider responses are cached, per prompt
    Stats,
    /// Delete every cached provider response
    Clear,
}

pub fn run(command: CacheCommand, cache_dir: Option<PathBuf>) -> Result<()> {
    let Some(cache_dir) = cache_dir.or_else(AiConfig::cache_dir_from_env) else {
        println!("AI response cache is disabled (WANDER_AI_CACHE_DIR=none)");
        return Ok(());
    };
    let cache = AiCache::new(cache_dir.clone());

    match command {
        CacheCommand::Stats => {
            let stats = cache.stats();
            println!("Cache directory: {}", cache_dir.display());
            println!("Cached responses: {}", stats.cached_responses);
            for (prompt_name, count) in &stats.by_prompt {
                println!("  {}: {}", prompt_name, count);
            }
        }
        CacheCommand::Clear => {
            cache
                .clear()
                .with_context(|| format!("Failed to clear {}", cache_dir.display()))?;
            println!("Cache cleared: {}", cache_dir.display());
        }
    }

    Ok(())
}
