//! Entry point resolution inside the installed-dependency tree.
//!
//! - `pkg` resolves through `pkg/package.json`: `module`, then `main`, then
//!   `index.js`
//! - `pkg/sub/path` resolves to the file `pkg/sub/path` itself
//!
//! Each candidate is tried as written, then with `.js`, `.mjs` and
//! `/index.js` appended.

use std::path::{Path, PathBuf};

use flash_transform::specifier::{package_name, subpath};
use path_clean::PathClean;
use serde::Deserialize;

use crate::error::{BuildError, Result};

const CANDIDATE_SUFFIXES: &[&str] = &["", ".js", ".mjs", "/index.js"];

/// The fields of `package.json` that pick an entry point.
#[derive(Debug, Default, Deserialize)]
pub struct PackageManifest {
    pub module: Option<String>,
    pub main: Option<String>,
}

impl PackageManifest {
    /// `module`, then `main`, then `index.js`.
    pub fn entry(&self) -> &str {
        self.module
            .as_deref()
            .or(self.main.as_deref())
            .filter(|entry| !entry.trim().is_empty())
            .unwrap_or("index.js")
    }
}

/// Resolve the file the bundler starts from for a dependency key.
pub async fn resolve_entry(deps_root: &Path, key: &str) -> Result<PathBuf> {
    let package_dir = deps_root.join(package_name(key)).clean();
    let not_found = || BuildError::EntryNotFound {
        key: key.to_string(),
        searched: package_dir.clone(),
    };

    if !is_dir(&package_dir).await {
        return Err(not_found());
    }

    let relative = match subpath(key) {
        Some(sub) => sub.to_string(),
        None => read_manifest(&package_dir).await?.entry().to_string(),
    };

    for suffix in CANDIDATE_SUFFIXES {
        let candidate = package_dir.join(format!("{relative}{suffix}")).clean();
        // Manifest fields may not climb out of the package
        if !candidate.starts_with(&package_dir) {
            break;
        }
        if is_file(&candidate).await {
            return Ok(candidate);
        }
    }

    Err(not_found())
}

async fn read_manifest(package_dir: &Path) -> Result<PackageManifest> {
    let path = package_dir.join("package.json");
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => {
            serde_json::from_str(&text).map_err(|source| BuildError::Manifest { path, source })
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(PackageManifest::default()),
        Err(err) => Err(BuildError::io(path, err)),
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_dir())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tempfile::TempDir;

    fn package(root: &Path, name: &str, manifest: Option<&str>, files: &[&str]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        if let Some(manifest) = manifest {
            fs::write(dir.join("package.json"), manifest).unwrap();
        }
        for file in files {
            let path = dir.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "export default 1;\n").unwrap();
        }
    }

    #[test]
    fn manifest_prefers_module_over_main() {
        let manifest = PackageManifest {
            module: Some("dist/index.mjs".to_string()),
            main: Some("dist/index.cjs".to_string()),
        };
        assert_eq!(manifest.entry(), "dist/index.mjs");
        assert_eq!(PackageManifest::default().entry(), "index.js");
    }

    #[tokio::test]
    async fn resolves_module_field() {
        let temp = TempDir::new().unwrap();
        package(
            temp.path(),
            "esm-pkg",
            Some(r#"{"main":"lib/index.cjs","module":"lib/index.mjs"}"#),
            &["lib/index.mjs", "lib/index.cjs"],
        );
        let entry = resolve_entry(temp.path(), "esm-pkg").await.unwrap();
        assert!(entry.ends_with("esm-pkg/lib/index.mjs"));
    }

    #[tokio::test]
    async fn main_without_extension_gets_suffixes() {
        let temp = TempDir::new().unwrap();
        package(temp.path(), "cjs-pkg", Some(r#"{"main":"lib/main"}"#), &["lib/main.js"]);
        let entry = resolve_entry(temp.path(), "cjs-pkg").await.unwrap();
        assert!(entry.ends_with("cjs-pkg/lib/main.js"));
    }

    #[tokio::test]
    async fn falls_back_to_index() {
        let temp = TempDir::new().unwrap();
        package(temp.path(), "bare", None, &["index.js"]);
        let entry = resolve_entry(temp.path(), "bare").await.unwrap();
        assert!(entry.ends_with("bare/index.js"));
    }

    #[tokio::test]
    async fn subpaths_and_scopes() {
        let temp = TempDir::new().unwrap();
        package(temp.path(), "react-dom", Some("{}"), &["index.js", "client.js"]);
        package(temp.path(), "@scope/ui", Some(r#"{"main":"main.js"}"#), &["main.js", "button/index.js"]);

        let client = resolve_entry(temp.path(), "react-dom/client").await.unwrap();
        assert!(client.ends_with("react-dom/client.js"));

        let scoped = resolve_entry(temp.path(), "@scope/ui").await.unwrap();
        assert!(scoped.ends_with("@scope/ui/main.js"));

        let button = resolve_entry(temp.path(), "@scope/ui/button").await.unwrap();
        assert!(button.ends_with("@scope/ui/button/index.js"));
    }

    #[tokio::test]
    async fn missing_package_is_entry_not_found() {
        let temp = TempDir::new().unwrap();
        let err = resolve_entry(temp.path(), "nope").await.unwrap_err();
        assert!(matches!(err, BuildError::EntryNotFound { .. }));

        package(temp.path(), "empty", Some(r#"{"main":"gone.js"}"#), &[]);
        let err = resolve_entry(temp.path(), "empty").await.unwrap_err();
        assert!(matches!(err, BuildError::EntryNotFound { .. }));
    }

    #[tokio::test]
    async fn malformed_manifest_is_reported() {
        let temp = TempDir::new().unwrap();
        package(temp.path(), "broken", Some("{ not json"), &["index.js"]);
        let err = resolve_entry(temp.path(), "broken").await.unwrap_err();
        assert!(matches!(err, BuildError::Manifest { .. }));
    }
}
