//! Shared state for the development server.

use std::path::Path;
use std::sync::Arc;

use flash_bundler::{ArtifactStore, DependencyCache, RolldownBundler};
use flash_config::FlashConfig;
use flash_transform::{OxcTranspiler, TranspileOptions, Transpiler, module_id};

use crate::error::Result;

/// Everything a request handler needs, shared behind an `Arc`.
pub struct DevServerState {
    pub config: FlashConfig,

    /// Process-wide dependency artifact cache
    pub cache: Arc<DependencyCache>,

    /// Per-file source transform
    pub transpiler: Arc<dyn Transpiler>,
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevServerState>;

impl DevServerState {
    pub fn new(
        config: FlashConfig,
        cache: Arc<DependencyCache>,
        transpiler: Arc<dyn Transpiler>,
    ) -> Self {
        Self {
            config,
            cache,
            transpiler,
        }
    }

    /// State wired to the OXC transpiler and the rolldown-backed cache.
    pub fn from_config(config: FlashConfig) -> Result<Self> {
        let transpiler = OxcTranspiler::new(TranspileOptions {
            target: config.target.clone(),
            sourcemap: config.sourcemap,
        })?;
        let cache = dependency_cache(&config)?;
        Ok(Self::new(config, cache, Arc::new(transpiler)))
    }

    /// Module id of `path` as seen by clients (`src/app.tsx`).
    pub fn module_id(&self, path: &Path) -> String {
        module_id(&self.config.root, path)
    }
}

/// The dependency cache described by `config`.
pub fn dependency_cache(config: &FlashConfig) -> Result<Arc<DependencyCache>> {
    let store = ArtifactStore::new(config.artifact_dir(), config.artifact_url_base()?);
    let bundler = RolldownBundler::new(config.root.clone());
    Ok(Arc::new(DependencyCache::new(
        config.deps_root(),
        store,
        Arc::new(bundler),
    )))
}
