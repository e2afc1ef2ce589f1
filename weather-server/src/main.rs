//! Binary crate for the `weather-server` HTTP API.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and resolving configuration
//! - Logging setup
//! - Serving the JSON API

use clap::Parser;

mod cli;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cmd = cli::Cli::parse();
    cmd.init_tracing();
    cmd.run().await
}
