//! Command-line interface for quantum_server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quantum tic-tac-toe server
#[derive(Parser, Debug)]
#[command(name = "quantum_server")]
#[command(about = "HTTP server for quantum tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to the TOML config file
        #[arg(short, long, default_value = quantum_server::DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play a scripted cycle and collapse, printing each step
    Demo,
}
