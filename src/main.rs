//! govwx - caching gateway for the legacy weather.gov XML services

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use govwx::cache::{Cache, CacheStore, DiskStore, MemoryStore};
use govwx::cli::Cli;
use govwx::config::GatewayConfig;
use govwx::handlers::Gateway;
use govwx::server;

/// Picks the cache store from CLI options, falling back to memory when no
/// usable disk location exists.
fn select_store(cli: &Cli) -> Arc<dyn CacheStore> {
    if cli.memory_cache {
        return Arc::new(MemoryStore::new());
    }
    if let Some(dir) = &cli.cache_dir {
        return Arc::new(DiskStore::with_dir(dir.clone()));
    }
    match DiskStore::new() {
        Some(store) => Arc::new(store),
        None => {
            tracing::warn!("no cache directory available; falling back to in-memory cache");
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = GatewayConfig::load(cli.config.as_deref())?;

    let cache = Cache::new(select_store(&cli));
    let gateway = Arc::new(Gateway::new(config, cache)?);

    tracing::info!(address = %cli.bind, "govwx listening");
    server::run(gateway, cli.bind).await;

    Ok(())
}
