//! Logging setup for the flash CLI.
//!
//! Every crate in the workspace logs through `tracing`; this module installs
//! the one subscriber that prints those events.
//!
//! - `--verbose` turns on debug output for the flash crates
//! - `--quiet` keeps errors only
//! - otherwise `RUST_LOG` wins when set, with `info` as the fallback
//!
//! ```rust,no_run
//! use flash_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("dev server starting");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str =
    "flash=debug,flash_cli=debug,flash_bundler=debug,flash_transform=debug,flash_config=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str =
    "flash=info,flash_cli=info,flash_bundler=info,flash_transform=info,flash_config=info";

/// Initialize the global tracing subscriber.
///
/// Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
