//! Error handling for the flash CLI.
//!
//! `CliError` is the top-level error returned by commands. Domain errors
//! from the config, transform and bundler crates convert into it through
//! `#[from]`, and [`ResultExt`] attaches paths, hints and context on the way
//! up. `main` turns the final error into a `miette` report.
//!
//! # Example
//!
//! ```rust,no_run
//! use flash_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn source_tree(path: &Path) -> Result<std::fs::Metadata> {
//!     std::fs::metadata(path)
//!         .with_path(path)
//!         .with_hint("Create the source directory or set src_dir")
//! }
//! ```

mod report;

use std::path::PathBuf;

use flash_bundler::SharedBuildError;
use flash_config::ConfigError;
use flash_transform::TransformError;
use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading or validation failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A dependency pre-bundle failed
    #[error("Pre-bundle error: {0}")]
    Build(#[from] SharedBuildError),

    /// Transpiler setup failed (bad target and the like)
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// One or more packages could not be pre-bundled
    #[error("Failed to pre-bundle {} package(s): {}\n\nHint: Check that each package is installed under the dependency directory", .0.len(), .0.join(", "))]
    PrebundleFailed(Vec<String>),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Listener setup or serve loop failures
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Another error with a hint or context attached
    #[error("{0}")]
    Custom(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn an I/O `NotFound` into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a `Hint:` line to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message with `msg`.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use flash_bundler::BuildError;

    use super::*;

    #[test]
    fn test_cli_error_from_config_error() {
        let cli_err: CliError = ConfigError::NotFound(PathBuf::from("flash.config.json")).into();
        assert!(matches!(cli_err, CliError::Config(_)));
        assert!(cli_err.to_string().contains("flash.config.json"));
    }

    #[test]
    fn test_cli_error_from_shared_build_error() {
        let build_err = Arc::new(BuildError::NoOutput("react".to_string()));
        let cli_err: CliError = build_err.into();
        assert!(matches!(cli_err, CliError::Build(_)));
        assert!(cli_err.to_string().contains("react"));
    }

    #[test]
    fn test_prebundle_failed_lists_packages() {
        let err = CliError::PrebundleFailed(vec!["left-pad".into(), "@scope/pkg".into()]);
        let msg = err.to_string();
        assert!(msg.contains("2 package(s)"));
        assert!(msg.contains("left-pad, @scope/pkg"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let err = result.with_path("/site/index.html").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(p) if p == PathBuf::from("/site/index.html")));
    }

    #[test]
    fn test_result_ext_with_path_keeps_other_io_errors() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));

        let err = result.with_path("/site/index.html").unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_result_ext_with_hint() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::RootNotFound(PathBuf::from("/nowhere")));

        let msg = result.with_hint("Pass --root").unwrap_err().to_string();
        assert!(msg.contains("/nowhere"));
        assert!(msg.contains("Hint: Pass --root"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), CliError> = Err(CliError::Server("boom".into()));
        let msg = result.context("Failed to start").unwrap_err().to_string();
        assert_eq!(msg, "Failed to start: Server error: boom");
    }
}
