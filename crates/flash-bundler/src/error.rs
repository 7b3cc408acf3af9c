//! Error types for dependency pre-bundling

use std::path::PathBuf;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

/// A build failure as seen by every caller awaiting the same build.
pub type SharedBuildError = Arc<BuildError>;

#[derive(Error, Debug, Diagnostic)]
pub enum BuildError {
    /// No entry point could be found for the package
    #[error("Cannot find an entry point for '{key}' under {}", searched.display())]
    #[diagnostic(
        code(flash::bundler::entry_not_found),
        help("Check that the package is installed and its package.json names a 'module' or 'main' file")
    )]
    EntryNotFound { key: String, searched: PathBuf },

    /// The package manifest exists but is not valid JSON
    #[error("Invalid package manifest {}: {source}", path.display())]
    #[diagnostic(code(flash::bundler::manifest))]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The bundler rejected the input or failed while generating
    #[error("Bundling '{key}' failed: {message}")]
    #[diagnostic(code(flash::bundler::rolldown))]
    Bundler { key: String, message: String },

    /// The bundler produced no entry chunk
    #[error("Bundling '{0}' produced no output")]
    #[diagnostic(code(flash::bundler::no_output))]
    NoOutput(String),

    #[error("I/O error at {}: {source}", path.display())]
    #[diagnostic(code(flash::bundler::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The build task was cancelled or panicked
    #[error("Build task for '{0}' did not complete")]
    #[diagnostic(code(flash::bundler::join))]
    Join(String),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
