//! Single-file transpilation.
//!
//! The [`Transpiler`] trait is the seam the dev server calls per request.
//! [`OxcTranspiler`] implements it with the OXC toolchain:
//!
//! 1. Parse with a source type derived from the file extension
//! 2. Build semantic scoping
//! 3. Run the transformer (TypeScript erasure, automatic JSX, lowering to
//!    the configured target)
//! 4. Print, optionally with an inline source map
//!
//! No cross-file work happens here; imports are left for the rewrite engine.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{ESTarget, JsxRuntime, TransformOptions, Transformer};

use crate::error::TransformError;

pub type Result<T> = std::result::Result<T, TransformError>;

/// Extensions the transpiler accepts.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "ts", "tsx", "mts"];

/// Whether `path` has a transpilable extension.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Shape of the emitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    /// ES module; `import`/`export` allowed
    #[default]
    Module,
    /// Classic script; module syntax is a parse error
    Script,
}

/// Black-box single-file compiler.
#[async_trait]
pub trait Transpiler: Send + Sync {
    /// Compile the file at `path` into browser-loadable code.
    async fn transpile(&self, path: &Path, kind: OutputKind) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileOptions {
    /// Lowering target (`es2020`, `esnext`, ...)
    pub target: String,
    /// Append an inline `sourceMappingURL` data URL
    pub sourcemap: bool,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            target: "es2020".to_string(),
            sourcemap: true,
        }
    }
}

impl TranspileOptions {
    fn oxc_options(&self) -> Result<TransformOptions> {
        let target = ESTarget::from_str(&self.target).map_err(|message| {
            TransformError::InvalidTarget {
                target: self.target.clone(),
                message: message.to_string(),
            }
        })?;

        let mut options = TransformOptions::from(target);
        options.jsx.runtime = JsxRuntime::Automatic;
        options.jsx.development = false;
        Ok(options)
    }
}

/// [`Transpiler`] backed by OXC.
#[derive(Debug, Clone, Default)]
pub struct OxcTranspiler {
    options: TranspileOptions,
}

impl OxcTranspiler {
    pub fn new(options: TranspileOptions) -> Result<Self> {
        // Surface a bad target at startup rather than on the first request
        options.oxc_options()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &TranspileOptions {
        &self.options
    }
}

#[async_trait]
impl Transpiler for OxcTranspiler {
    async fn transpile(&self, path: &Path, kind: OutputKind) -> Result<String> {
        if !is_source_file(path) {
            return Err(TransformError::UnsupportedFile(path.to_path_buf()));
        }

        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TransformError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let owned_path = path.to_path_buf();
        let options = self.options.clone();
        tokio::task::spawn_blocking(move || transform_source(&owned_path, &source, kind, &options))
            .await
            .map_err(|_| TransformError::Task(path.to_path_buf()))?
    }
}

/// Compile `source` as if it were read from `path`.
pub fn transform_source(
    path: &Path,
    source: &str,
    kind: OutputKind,
    options: &TranspileOptions,
) -> Result<String> {
    let source_type = SourceType::from_path(path)
        .map_err(|_| TransformError::UnsupportedFile(path.to_path_buf()))?;
    let source_type = match kind {
        OutputKind::Module => source_type.with_module(true),
        OutputKind::Script => source_type.with_script(true),
    };

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, source_type).parse();
    if !parsed.errors.is_empty() {
        return Err(TransformError::Parse {
            path: path.to_path_buf(),
            message: join_diagnostics(&parsed.errors),
        });
    }
    let mut program = parsed.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();

    let transform_options = options.oxc_options()?;
    let transformed = Transformer::new(&allocator, path, &transform_options)
        .build_with_scoping(scoping, &mut program);
    if !transformed.errors.is_empty() {
        return Err(TransformError::Transform {
            path: path.to_path_buf(),
            message: join_diagnostics(&transformed.errors),
        });
    }

    let codegen_options = CodegenOptions {
        source_map_path: options.sourcemap.then(|| PathBuf::from(path)),
        ..CodegenOptions::default()
    };
    let printed = Codegen::new().with_options(codegen_options).build(&program);

    let mut code = printed.code;
    if let Some(map) = printed.map {
        if !code.ends_with('\n') {
            code.push('\n');
        }
        code.push_str("//# sourceMappingURL=");
        code.push_str(&map.to_data_url());
        code.push('\n');
    }

    tracing::trace!(path = %path.display(), bytes = code.len(), "transpiled");
    Ok(code)
}

fn join_diagnostics<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|error| error.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> TranspileOptions {
        TranspileOptions {
            sourcemap: false,
            ..TranspileOptions::default()
        }
    }

    #[test]
    fn recognises_source_extensions() {
        assert!(is_source_file(Path::new("src/app.tsx")));
        assert!(is_source_file(Path::new("lib/util.mjs")));
        assert!(!is_source_file(Path::new("style.css")));
        assert!(!is_source_file(Path::new("README")));
    }

    #[test]
    fn erases_types() {
        let code = transform_source(
            Path::new("src/math.ts"),
            "export function add(a: number, b: number): number { return a + b; }\n",
            OutputKind::Module,
            &plain(),
        )
        .unwrap();
        assert!(code.contains("export function add(a, b)"));
        assert!(!code.contains(": number"));
    }

    #[test]
    fn compiles_jsx_to_runtime_calls() {
        let code = transform_source(
            Path::new("src/app.jsx"),
            "export const App = () => <div className=\"app\">hi</div>;\n",
            OutputKind::Module,
            &plain(),
        )
        .unwrap();
        assert!(code.contains("react/jsx-runtime"));
        assert!(!code.contains("<div"));
    }

    #[test]
    fn inlines_source_map_when_enabled() {
        let code = transform_source(
            Path::new("src/a.ts"),
            "export const a: number = 1;\n",
            OutputKind::Module,
            &TranspileOptions::default(),
        )
        .unwrap();
        assert!(code.contains("//# sourceMappingURL=data:application/json;"));
    }

    #[test]
    fn reports_syntax_errors() {
        let err = transform_source(
            Path::new("src/broken.ts"),
            "export const = ;\n",
            OutputKind::Module,
            &plain(),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::Parse { .. }));
        assert!(err.to_string().contains("broken.ts"));
    }

    #[test]
    fn rejects_unknown_target() {
        let err = OxcTranspiler::new(TranspileOptions {
            target: "es1999".to_string(),
            sourcemap: false,
        })
        .unwrap_err();
        assert!(matches!(err, TransformError::InvalidTarget { .. }));
    }

    #[tokio::test]
    async fn transpile_reads_from_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("main.ts");
        std::fs::write(&path, "const n: number = 1;\nexport default n;\n").unwrap();

        let transpiler = OxcTranspiler::new(plain()).unwrap();
        let code = transpiler
            .transpile(&path, OutputKind::Module)
            .await
            .unwrap();
        assert!(code.contains("const n = 1"));

        let missing = transpiler
            .transpile(&temp.path().join("gone.ts"), OutputKind::Module)
            .await
            .unwrap_err();
        assert!(missing.is_not_found());
    }
}
