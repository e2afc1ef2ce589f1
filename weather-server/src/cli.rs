use anyhow::Context;
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;
use warp::Filter;

use weather_core::{Config, SqliteReadingStore, WeatherService, provider::provider_from_config};

use crate::routes;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "City weather HTTP API")]
pub struct Cli {
    /// Path to a TOML config file; defaults to the platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on (overrides config and PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// SQLite database file (overrides config and DATABASE_PATH).
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Directory of static files to serve next to the API.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn init_tracing(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };

        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    /// Merge file/env config with command-line overrides.
    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }
        if let Some(dir) = &self.static_dir {
            config.static_dir = Some(dir.clone());
        }

        Ok(config)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.resolve_config()?;

        let provider = provider_from_config(&config)?;
        let store = SqliteReadingStore::open(&config.database_path).with_context(|| {
            format!("Failed to open database: {}", config.database_path.display())
        })?;
        info!(path = %config.database_path.display(), "Opened reading store");

        let service = WeatherService::new(Arc::from(provider), Arc::new(store));
        let api = routes::api(service);
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

        info!("Weather server running on {addr}");

        match config.static_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "Serving static files");
                warp::serve(api.or(warp::fs::dir(dir))).run(addr).await;
            }
            None => warp::serve(api).run(addr).await,
        }

        Ok(())
    }
}
