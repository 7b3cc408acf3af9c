//! Per-request module compilation for the flash dev server.
//!
//! Two stages turn a file from the source tree into something a browser can
//! `import`:
//!
//! - [`pipeline`] - the single-file transpiler seam ([`Transpiler`]) and its
//!   OXC implementation: types erased, JSX compiled, syntax lowered
//! - [`rewrite`] - the import rewrite engine: every module-loading statement
//!   in the transpiled text is retargeted so the browser can resolve it
//!
//! Specifier classification lives in [`specifier`], module identifiers in
//! [`module_id`].
//!
//! # Example
//!
//! ```rust
//! use flash_transform::{ArtifactLookup, rewrite_imports};
//!
//! struct Deps;
//!
//! impl ArtifactLookup for Deps {
//!     fn artifact_url(&self, key: &str) -> String {
//!         format!("/deps/{}.js", key.replace('/', "_"))
//!     }
//!
//!     fn is_ready(&self, _key: &str) -> bool {
//!         true
//!     }
//! }
//!
//! let out = rewrite_imports("import { useState } from 'react';", &Deps)?;
//! assert!(out.code.contains("/deps/react.js"));
//! # Ok::<(), flash_transform::RewriteError>(())
//! ```

pub mod error;
pub mod module_id;
pub mod pipeline;
pub mod rewrite;
pub mod specifier;

pub use error::{RewriteError, TransformError};
pub use module_id::module_id;
pub use pipeline::{OutputKind, OxcTranspiler, TranspileOptions, Transpiler, is_source_file};
pub use rewrite::{
    ArtifactLookup, BindingKind, ImportBinding, RewriteOutcome, RewrittenImport, dependency_keys,
    rewrite_imports,
};
pub use specifier::{ASSET_FLAG, SpecifierKind, classify, dependency_key, package_name};
