//! Conversion from CLI errors to `miette` reports.

use miette::Report;

use crate::error::CliError;

/// Convert a `CliError` into a report for the terminal.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Build(e) => miette::miette!(
            "Pre-bundle error: {}\n\nHint: Check that the package is installed and exports an entry point",
            e
        ),
        CliError::Transform(e) => Report::new(e),
        other => miette::miette!("{}", other),
    }
}
