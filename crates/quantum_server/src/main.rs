//! Quantum tic-tac-toe - unified CLI
//!
//! Runs the HTTP server or the scripted demo.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use quantum_server::{ServerConfig, run_demo, serve};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => run_server(config, host, port).await,
        Command::Demo => {
            init_tracing("warn");
            print!("{}", run_demo()?);
            Ok(())
        }
    }
}

/// Run the HTTP game server
async fn run_server(config: PathBuf, host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = ServerConfig::load_or_default(&config)?.with_overrides(host, port);
    init_tracing(config.log_filter());

    info!(
        host = %config.host(),
        port = config.port(),
        max_options = config.max_options(),
        "Starting quantum tic-tac-toe server"
    );
    serve(&config).await
}

fn init_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}
