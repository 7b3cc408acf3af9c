//! The bundler seam and its rolldown implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rolldown::{BundlerBuilder, BundlerOptions, InputItem, OutputFormat, Platform};
use rolldown_common::Output;

use crate::error::{BuildError, Result};

/// Black-box multi-file bundler: one entry in, one browser-ready file out.
#[async_trait]
pub trait DependencyBundler: Send + Sync {
    /// Bundle `entry` and everything it imports into `artifact`.
    ///
    /// The artifact must expose the package as its single default export.
    async fn bundle(&self, key: &str, entry: &Path, artifact: &Path) -> Result<()>;
}

/// Prepended to every artifact; CommonJS builds read `process.env.NODE_ENV`.
const ARTIFACT_PRELUDE: &str =
    "var process = globalThis.process ?? { env: { NODE_ENV: \"development\" } };\n";

/// [`DependencyBundler`] backed by rolldown.
///
/// The package entry is wrapped in a generated module that re-exports the
/// package namespace as `default`. Importers read named exports off that
/// namespace and take the package's own default from its `default` member,
/// which CommonJS interop fills with `module.exports`.
#[derive(Debug, Clone)]
pub struct RolldownBundler {
    cwd: PathBuf,
}

impl RolldownBundler {
    /// `cwd` anchors rolldown's resolver, normally the project root.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    fn options(&self, wrapper: &Path) -> BundlerOptions {
        BundlerOptions {
            input: Some(vec![InputItem {
                name: Some("artifact".to_string()),
                import: wrapper.to_string_lossy().into_owned(),
            }]),
            cwd: Some(self.cwd.clone()),
            format: Some(OutputFormat::Esm),
            platform: Some(Platform::Browser),
            inline_dynamic_imports: Some(true),
            ..Default::default()
        }
    }
}

/// Source of the wrapper module for a package entry.
fn wrapper_source(entry: &Path) -> String {
    let entry = serde_json::Value::String(entry.to_string_lossy().into_owned());
    format!("import * as ns from {entry};\nexport default ns;\n")
}

#[async_trait]
impl DependencyBundler for RolldownBundler {
    async fn bundle(&self, key: &str, entry: &Path, artifact: &Path) -> Result<()> {
        let dir = artifact
            .parent()
            .ok_or_else(|| BuildError::NoOutput(key.to_string()))?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| BuildError::io(dir, e))?;

        let wrapper = artifact.with_extension("entry.mjs");
        tokio::fs::write(&wrapper, wrapper_source(entry))
            .await
            .map_err(|e| BuildError::io(&wrapper, e))?;

        let generated = self.generate(key, &wrapper).await;
        // Best effort: a stale wrapper is overwritten on the next build
        let _ = tokio::fs::remove_file(&wrapper).await;
        let code = generated?;

        write_atomic(artifact, &format!("{ARTIFACT_PRELUDE}{code}")).await
    }
}

impl RolldownBundler {
    async fn generate(&self, key: &str, wrapper: &Path) -> Result<String> {
        let bundler_error = |e: &dyn std::fmt::Debug| BuildError::Bundler {
            key: key.to_string(),
            message: format!("{e:?}"),
        };

        let mut bundler = BundlerBuilder::default()
            .with_options(self.options(wrapper))
            .with_plugins(vec![])
            .build()
            .map_err(|e| bundler_error(&e))?;

        let output = bundler.generate().await.map_err(|e| bundler_error(&e))?;

        output
            .assets
            .iter()
            .find_map(|item| match item {
                Output::Chunk(chunk) if chunk.is_entry => Some(chunk.code.clone()),
                _ => None,
            })
            .ok_or_else(|| BuildError::NoOutput(key.to_string()))
    }
}

/// Write through a temp file and rename, so a reader never sees a partial
/// artifact.
async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp = path.with_extension("js.tmp");
    tokio::fs::write(&temp, contents)
        .await
        .map_err(|e| BuildError::io(&temp, e))?;
    tokio::fs::rename(&temp, path)
        .await
        .map_err(|e| BuildError::io(path, e))
}
