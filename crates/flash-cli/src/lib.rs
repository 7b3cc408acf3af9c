//! flash CLI - an unbundled ESM development server.
//!
//! Source files are served one module at a time: each request is
//! transpiled on demand, its bare imports are pointed at pre-bundled
//! dependency artifacts, and edits are announced to the browser over a
//! WebSocket so modules can hot-swap.
//!
//! # Architecture
//!
//! - [`cli`] - argument parsing
//! - [`commands`] - `dev` and `prebundle`
//! - [`dev`] - router, listeners, watchers and the notification hub
//! - [`error`] - error types with actionable messages
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - status lines for the terminal
//!
//! # Example
//!
//! ```rust,no_run
//! use flash_cli::dev::{DevServer, DevServerState, SocketHub};
//! use flash_config::FlashConfig;
//! use std::sync::Arc;
//!
//! # async fn run() -> flash_cli::Result<()> {
//! let state = Arc::new(DevServerState::from_config(FlashConfig::with_root("."))?);
//! let server = DevServer::bind(state, Arc::new(SocketHub::new())).await?;
//! server.run().await
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
