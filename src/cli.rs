//! Command-line interface for the govwx gateway

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// govwx - a caching gateway for the legacy weather.gov XML services
#[derive(Parser, Debug)]
#[command(name = "govwx")]
#[command(about = "Caching HTTP gateway for weather.gov alerts, observations, and forecasts")]
#[command(version)]
pub struct Cli {
    /// Address and port to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for the disk cache (defaults to the XDG cache directory)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Keep the cache in memory instead of on disk
    #[arg(long)]
    pub memory_cache: bool,
}
