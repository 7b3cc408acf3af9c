//! Error types for module transformation and import rewriting

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while transpiling a single source file
#[derive(Error, Debug, Diagnostic)]
pub enum TransformError {
    /// The source file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    #[diagnostic(code(flash::transform::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not one the transpiler handles
    #[error("Unsupported source file: {}", .0.display())]
    #[diagnostic(
        code(flash::transform::unsupported_file),
        help("Only .js, .jsx, .mjs, .ts, .tsx and .mts files are transpiled")
    )]
    UnsupportedFile(PathBuf),

    /// The source failed to parse
    #[error("Syntax error in {}: {message}", path.display())]
    #[diagnostic(code(flash::transform::parse))]
    Parse { path: PathBuf, message: String },

    /// Lowering or JSX compilation failed
    #[error("Transform failed for {}: {message}", path.display())]
    #[diagnostic(code(flash::transform::lowering))]
    Transform { path: PathBuf, message: String },

    /// The configured lowering target is not understood
    #[error("Invalid transform target '{target}': {message}")]
    #[diagnostic(
        code(flash::transform::invalid_target),
        help("Use a target such as 'es2020' or 'esnext'")
    )]
    InvalidTarget { target: String, message: String },

    /// The blocking transform task was cancelled or panicked
    #[error("Transform task for {} did not complete", .0.display())]
    #[diagnostic(code(flash::transform::task))]
    Task(PathBuf),
}

impl TransformError {
    /// Whether the error means the file simply is not there.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Errors raised while rewriting import specifiers
#[derive(Error, Debug, Diagnostic)]
pub enum RewriteError {
    /// The transpiled text did not parse as a module
    #[error("Cannot scan imports: {0}")]
    #[diagnostic(code(flash::rewrite::parse))]
    Parse(String),

    /// A bare import has no ready artifact
    #[error("Cannot resolve import '{specifier}': no pre-bundled artifact for package '{package}'")]
    #[diagnostic(
        code(flash::rewrite::unresolved),
        help("Install the package into the dependency tree and reload")
    )]
    Unresolved { specifier: String, package: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_names_the_package() {
        let err = RewriteError::Unresolved {
            specifier: "missing-pkg/sub".to_string(),
            package: "missing-pkg".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'missing-pkg/sub'"));
        assert!(msg.contains("package 'missing-pkg'"));
    }

    #[test]
    fn read_not_found_is_detected() {
        let err = TransformError::Read {
            path: PathBuf::from("src/gone.ts"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.is_not_found());

        let err = TransformError::UnsupportedFile(PathBuf::from("a.txt"));
        assert!(!err.is_not_found());
    }
}
