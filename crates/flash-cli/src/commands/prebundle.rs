//! Pre-bundle dependencies without starting the server.

use std::time::Instant;

use flash_config::FlashConfig;
use futures::future::join_all;

use crate::cli::PrebundleArgs;
use crate::dev::dependency_cache;
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the prebundle command.
///
/// Every package is built concurrently through the same cache the server
/// uses; packages that already have an artifact are left alone.
pub async fn execute(args: PrebundleArgs) -> Result<()> {
    let config = FlashConfig::load(&args.overrides())?;
    config.validate()?;

    let cache = dependency_cache(&config)?;
    ui::info(&format!(
        "Pre-bundling {} package(s) into {}",
        args.packages.len(),
        cache.store().dir().display()
    ));

    let started = Instant::now();
    let outcomes = join_all(args.packages.iter().map(|package| cache.ensure_built(package))).await;

    let mut failed = Vec::new();
    for (package, outcome) in args.packages.iter().zip(outcomes) {
        match outcome {
            Ok(artifact) => ui::success(&format!("{} → {}", package, artifact.display())),
            Err(err) => {
                ui::error(&format!("{}: {}", package, err));
                failed.push(package.clone());
            }
        }
    }

    if !failed.is_empty() {
        return Err(CliError::PrebundleFailed(failed));
    }

    ui::success(&format!(
        "Pre-bundled {} package(s) in {}ms",
        args.packages.len(),
        started.elapsed().as_millis()
    ));
    Ok(())
}
