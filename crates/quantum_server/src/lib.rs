//! HTTP boundary for the quantum tic-tac-toe engine.
//!
//! One game lives behind a [`GameHandle`]; the axum router maps each request
//! onto a single engine operation and answers with plain JSON records.
//!
//! # Example
//!
//! ```no_run
//! use quantum_server::{ServerConfig, serve};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::load_or_default("quantum_tictactoe.toml")?;
//! serve(&config).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod demo;
mod responses;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, DEFAULT_CONFIG_PATH, ServerConfig};

// Crate-level exports - Demo
pub use demo::{DEMO_MOVES, run_demo};

// Crate-level exports - HTTP
pub use responses::{
    CollapseChoice, CollapseRequest, CollapseResponse, EntanglementsResponse, Failure,
    MeasureRequest, MoveRequest, MoveResponse, MovesResponse, RejectedEntry, StateResponse,
    WinnerResponse,
};
pub use server::{router, serve};
pub use session::GameHandle;
