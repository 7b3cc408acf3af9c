//! Command-line interface definition for flash.
//!
//! # Command Structure
//!
//! - `flash dev` - Serve the project with on-demand transforms and hot updates
//! - `flash prebundle` - Build dependency artifacts ahead of time

mod commands;
mod validation;

use clap::Parser;

pub use commands::{Command, DevArgs, PrebundleArgs};
pub use validation::parse_package;

/// Flash - an unbundled ESM development server
#[derive(Parser, Debug)]
#[command(
    name = "flash",
    version,
    about = "An unbundled ESM development server",
    long_about = "Flash serves a JavaScript/TypeScript project to the browser as native ES modules.\n\
                  Source files are transformed on request, npm dependencies are pre-bundled once\n\
                  into single-file artifacts, and edits are pushed to the page over a WebSocket."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows per-request routing, dependency resolution and watcher events.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
