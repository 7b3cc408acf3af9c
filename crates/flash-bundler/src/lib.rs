//! Dependency pre-bundling for the flash dev server.
//!
//! Third-party packages are bundled once into single browser-ready ES
//! modules under `<deps>/.flash/deps`, one file per dependency key. The
//! [`DependencyCache`] owns that store:
//!
//! - artifact paths are a pure function of the key ([`artifact_file_name`])
//! - a file already on disk counts as built (no content hashing)
//! - concurrent requests for one key coalesce into one bundler run
//! - failures are logged and leave the key retryable
//!
//! The bundler itself sits behind [`DependencyBundler`]; [`RolldownBundler`]
//! is the production implementation.

pub mod artifact;
pub mod bundler;
pub mod cache;
pub mod error;
pub mod resolve;

pub use artifact::{ArtifactStore, artifact_file_name};
pub use bundler::{DependencyBundler, RolldownBundler};
pub use cache::{BuildStatus, DependencyCache, DependencyCacheEntry};
pub use error::{BuildError, Result, SharedBuildError};
pub use resolve::{PackageManifest, resolve_entry};
