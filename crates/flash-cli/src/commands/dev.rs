//! Development server command implementation.
//!
//! Orchestrates the dev server lifecycle:
//! - Load and validate configuration
//! - Bind the HTTP and notification listeners
//! - Watch the dependency and source trees, debounced per tree
//! - Pre-bundle new packages, broadcast updates for edited sources
//! - Shut down on Ctrl+C; a server failure ends the command with an error

use std::sync::Arc;
use std::time::Duration;

use flash_config::FlashConfig;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinError;

use crate::cli::DevArgs;
use crate::dev::{
    DevServer, DevServerState, Debouncer, ProjectWatcher, SocketHub, WatchEvent, WatchHandler,
    WatchOutcome,
};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Execute the dev command.
pub async fn execute(args: DevArgs) -> Result<()> {
    ui::info("Starting flash dev server...");

    let config = FlashConfig::load(&args.overrides())?;
    config.validate()?;
    ui::info(&format!("Project root: {}", config.root.display()));

    let state = Arc::new(DevServerState::from_config(config)?);
    let hub = Arc::new(SocketHub::new());
    let config = &state.config;

    let server = DevServer::bind(Arc::clone(&state), Arc::clone(&hub))
        .await
        .with_hint("Free the ports or pick others with --port and --hmr-port")?;
    let (_watcher, mut raw_events) = ProjectWatcher::new(config.deps_root(), config.source_root())
        .with_hint("Create the source directory or set src_dir in flash.config.json")?;

    let window = Duration::from_millis(config.debounce_ms);
    let (debounced_tx, mut debounced) = mpsc::channel(100);
    let dependency_events = Debouncer::new(window, debounced_tx.clone());
    let source_events = Debouncer::new(window, debounced_tx);

    let handler = WatchHandler::new(config.root.clone(), Arc::clone(&state.cache), hub);

    let mut server_handle = tokio::spawn(server.run());

    ui::success(&format!("Dev server running at {}", config.server_url()));
    ui::info(&format!("Update channel at {}", config.hmr_url()));
    ui::info(&format!("Watching {}", config.source_root().display()));
    ui::info("Press Ctrl+C to stop");

    loop {
        tokio::select! {
            Some(event) = raw_events.recv() => {
                let key = event.path().to_path_buf();
                match event {
                    WatchEvent::DirectoryAdded(_) => dependency_events.push(key, event),
                    WatchEvent::FileChanged(_) => source_events.push(key, event),
                }
            }

            Some(event) = debounced.recv() => report(handler.handle(event)),

            _ = signal::ctrl_c() => {
                ui::info("Shutting down dev server...");
                break;
            }

            result = &mut server_handle => return server_exit(result),
        }
    }

    ui::success("Dev server stopped");
    Ok(())
}

/// The serve loop only returns on failure, so every exit is an error.
fn server_exit(result: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    match result {
        Ok(Ok(())) => Err(CliError::Server(
            "server task completed unexpectedly".to_string(),
        )),
        Ok(Err(e)) => Err(e).context("Dev server stopped"),
        Err(e) => Err(CliError::Server(format!("server task failed: {}", e))),
    }
}

fn report(outcome: WatchOutcome) {
    match outcome {
        WatchOutcome::Building(package) => ui::info(&format!("Pre-bundling {}", package)),
        WatchOutcome::Notified { file, clients } => ui::update(&file, clients),
        WatchOutcome::Skipped(package) => ui::debug(&format!("{} already pre-bundled", package)),
        WatchOutcome::Ignored => {}
    }
}
