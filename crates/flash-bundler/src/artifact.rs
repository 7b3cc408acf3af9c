//! Deterministic artifact naming.

use std::path::{Path, PathBuf};

/// File name of the artifact for a dependency key: `/` becomes `_`.
///
/// `react-dom/client` is stored as `react-dom_client.js`, `@scope/pkg` as
/// `@scope_pkg.js`.
pub fn artifact_file_name(key: &str) -> String {
    format!("{}.js", key.replace('/', "_"))
}

/// The on-disk artifact directory and the URL it is served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    dir: PathBuf,
    url_base: String,
}

impl ArtifactStore {
    /// `url_base` is the server path of `dir`, e.g. `/node_modules/.flash/deps`.
    pub fn new(dir: impl Into<PathBuf>, url_base: impl Into<String>) -> Self {
        let url_base = url_base.into();
        let url_base = format!("/{}", url_base.trim_matches('/'));
        Self {
            dir: dir.into(),
            url_base,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(artifact_file_name(key))
    }

    pub fn url(&self, key: &str) -> String {
        format!("{}/{}", self.url_base, artifact_file_name(key))
    }

    /// Whether the artifact file is on disk. No content check is made: a
    /// file left by an earlier install counts as current.
    pub fn exists(&self, key: &str) -> bool {
        self.path(key).is_file()
    }
}
