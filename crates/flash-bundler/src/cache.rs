//! The process-wide dependency cache.
//!
//! Keys are dependency specifiers without query (`react`, `react-dom/client`,
//! `@scope/pkg`). Each key maps to one artifact file whose path depends on
//! the key alone. Builds are lazy and single-flight: concurrent
//! [`DependencyCache::ensure_built`] calls for the same key share one
//! bundler invocation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use flash_transform::ArtifactLookup;
use flash_transform::specifier::dependency_key;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::artifact::ArtifactStore;
use crate::bundler::DependencyBundler;
use crate::error::{BuildError, SharedBuildError};
use crate::resolve::resolve_entry;

type BuildOutcome = std::result::Result<PathBuf, SharedBuildError>;
type InFlightBuild = Shared<BoxFuture<'static, BuildOutcome>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Absent,
    Building,
    Ready,
    /// Last build failed; the next `ensure_built` retries
    Failed,
}

/// Snapshot of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCacheEntry {
    pub key: String,
    pub artifact_path: PathBuf,
    pub status: BuildStatus,
}

pub struct DependencyCache {
    deps_root: PathBuf,
    store: ArtifactStore,
    bundler: Arc<dyn DependencyBundler>,
    statuses: Mutex<HashMap<String, BuildStatus>>,
    in_flight: Mutex<HashMap<String, InFlightBuild>>,
}

impl std::fmt::Debug for DependencyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyCache")
            .field("deps_root", &self.deps_root)
            .field("store", &self.store)
            .field("entries", &self.statuses.lock().len())
            .finish()
    }
}

impl DependencyCache {
    pub fn new(
        deps_root: impl Into<PathBuf>,
        store: ArtifactStore,
        bundler: Arc<dyn DependencyBundler>,
    ) -> Self {
        Self {
            deps_root: deps_root.into(),
            store,
            bundler,
            statuses: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn deps_root(&self) -> &Path {
        &self.deps_root
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Make sure the artifact for `specifier` exists, building it if needed.
    ///
    /// An artifact already on disk is returned without rebuilding. If a
    /// build for the same key is running, this awaits that build instead
    /// of starting another. The build runs on its own task, so it finishes
    /// even if every caller goes away.
    pub async fn ensure_built(self: &Arc<Self>, specifier: &str) -> BuildOutcome {
        let key = dependency_key(specifier).to_string();
        let artifact = self.store.path(&key);

        let build = {
            let mut in_flight = self.in_flight.lock();
            let running = in_flight.get(&key).cloned();
            match running {
                Some(build) => build,
                None if self.store.exists(&key) => {
                    drop(in_flight);
                    self.set_status(&key, BuildStatus::Ready);
                    return Ok(artifact);
                }
                None => {
                    let build = self.spawn_build(key.clone());
                    in_flight.insert(key, build.clone());
                    build
                }
            }
        };

        build.await
    }

    fn spawn_build(self: &Arc<Self>, key: String) -> InFlightBuild {
        self.set_status(&key, BuildStatus::Building);

        let cache = Arc::clone(self);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let outcome = cache.build(&task_key).await;
            cache.finish(&task_key, &outcome);
            outcome
        });

        async move {
            handle
                .await
                .unwrap_or_else(|_| Err(Arc::new(BuildError::Join(key))))
        }
        .boxed()
        .shared()
    }

    async fn build(&self, key: &str) -> BuildOutcome {
        let started = Instant::now();
        let artifact = self.store.path(key);

        let entry = resolve_entry(&self.deps_root, key).await?;
        tracing::debug!(key, entry = %entry.display(), "bundling dependency");

        self.bundler.bundle(key, &entry, &artifact).await?;

        tracing::info!(
            key,
            artifact = %artifact.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pre-bundled dependency"
        );
        Ok(artifact)
    }

    fn finish(&self, key: &str, outcome: &BuildOutcome) {
        match outcome {
            Ok(_) => self.set_status(key, BuildStatus::Ready),
            Err(err) => {
                tracing::error!(key, error = %err, "dependency build failed");
                self.set_status(key, BuildStatus::Failed);
            }
        }
        self.in_flight.lock().remove(key);
    }

    fn set_status(&self, key: &str, status: BuildStatus) {
        self.statuses.lock().insert(key.to_string(), status);
    }

    /// Current state of the entry for `specifier`.
    ///
    /// An artifact found on disk reports `Ready` even before any build ran.
    pub fn entry(&self, specifier: &str) -> DependencyCacheEntry {
        let key = dependency_key(specifier);
        let recorded = self.statuses.lock().get(key).copied();
        let status = match recorded {
            Some(BuildStatus::Building) => BuildStatus::Building,
            _ if self.store.exists(key) => BuildStatus::Ready,
            Some(BuildStatus::Failed) => BuildStatus::Failed,
            _ => BuildStatus::Absent,
        };

        DependencyCacheEntry {
            key: key.to_string(),
            artifact_path: self.store.path(key),
            status,
        }
    }

    /// Every key this cache has seen, sorted.
    pub fn entries(&self) -> Vec<DependencyCacheEntry> {
        let mut keys: Vec<String> = self.statuses.lock().keys().cloned().collect();
        keys.sort();
        keys.iter().map(|key| self.entry(key)).collect()
    }
}

impl ArtifactLookup for DependencyCache {
    fn artifact_url(&self, key: &str) -> String {
        self.store.url(dependency_key(key))
    }

    fn is_ready(&self, key: &str) -> bool {
        self.store.exists(dependency_key(key))
    }
}
