//! Request classification and per-kind responses.
//!
//! Every request URL maps to a file under the project root and then to one
//! [`RequestKind`]. Precedence is fixed:
//!
//! 1. `/favicon.ico` answers 204
//! 2. `?import` asset references become a URL module
//! 3. `/` serves the HTML shell with the client script injected
//! 4. `.css` becomes a style-injecting module
//! 5. images pass through with their MIME type
//! 6. files in the artifact store pass through as JavaScript
//! 7. source files are transformed and their imports rewritten
//! 8. anything else is a 404

use std::path::{Path, PathBuf};

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use flash_transform::specifier::{has_asset_flag, split_query};
use flash_transform::{
    OutputKind, RewriteError, TransformError, dependency_keys, is_source_file, rewrite_imports,
};
use futures::future::join_all;
use mime_guess::mime;
use thiserror::Error;

use crate::dev::client::{asset_url_module, css_module, hot_prelude, inject_client_script};
use crate::dev::state::DevServerState;

pub const JS_CONTENT_TYPE: &str = "application/javascript";
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const FAVICON_PATH: &str = "/favicon.ico";

/// Why a request could not be served.
///
/// Missing files are 404s; everything else is a 500 whose detail goes to
/// the log, not to the browser.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    #[error(transparent)]
    Resolution(#[from] RewriteError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Cannot read HTML shell {}: {source}", path.display())]
    ShellUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::AssetNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn read(path: &Path, source: std::io::Error, url: &str) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(url.to_string())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::NotFound(_) => "404 Not Found",
            Self::AssetNotFound(_) => "Asset not found",
            other => {
                tracing::error!(error = %other, "request failed");
                "Internal Server Error"
            }
        };
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

/// A request URL resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequest {
    /// URL path without query (`/src/app.tsx`)
    pub path: String,
    pub query: Option<String>,
    /// File the path names under the root
    pub file: PathBuf,
}

impl ModuleRequest {
    /// Resolve `target` (path plus optional query) under `root`.
    ///
    /// A `..` segment is a 404; requests never leave the root.
    pub fn parse(root: &Path, target: &str) -> Result<Self, ServeError> {
        let (path, query) = split_query(target);
        let path = if path.is_empty() { "/" } else { path };

        let mut file = root.to_path_buf();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(ServeError::NotFound(path.to_string())),
                part => file.push(part),
            }
        }

        Ok(Self {
            path: path.to_string(),
            query: query.map(str::to_string),
            file,
        })
    }

    pub fn is_asset_reference(&self) -> bool {
        self.query.as_deref().is_some_and(has_asset_flag)
    }

    fn has_extension(&self, ext: &str) -> bool {
        self.file
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Favicon,
    AssetReference,
    Shell,
    Stylesheet,
    Image,
    Artifact,
    Source,
    Unknown,
}

/// Pick the handler for `request`.
pub fn classify_request(request: &ModuleRequest, artifact_dir: &Path) -> RequestKind {
    if request.path == FAVICON_PATH {
        RequestKind::Favicon
    } else if request.is_asset_reference() {
        RequestKind::AssetReference
    } else if request.path == "/" {
        RequestKind::Shell
    } else if request.has_extension("css") {
        RequestKind::Stylesheet
    } else if image_mime(&request.file).is_some() {
        RequestKind::Image
    } else if request.file.starts_with(artifact_dir) {
        RequestKind::Artifact
    } else if is_source_file(&request.file) {
        RequestKind::Source
    } else {
        RequestKind::Unknown
    }
}

fn image_mime(path: &Path) -> Option<mime::Mime> {
    mime_guess::from_path(path)
        .first()
        .filter(|guess| guess.type_() == mime::IMAGE)
}

/// Serve one request.
pub async fn dispatch(
    state: &DevServerState,
    request: &ModuleRequest,
) -> Result<Response, ServeError> {
    let kind = classify_request(request, &state.config.artifact_dir());
    tracing::debug!(path = %request.path, ?kind, "serving request");

    match kind {
        RequestKind::Favicon => Ok(StatusCode::NO_CONTENT.into_response()),
        RequestKind::AssetReference => serve_asset_reference(request).await,
        RequestKind::Shell => serve_shell(state).await,
        RequestKind::Stylesheet => serve_stylesheet(state, request).await,
        RequestKind::Image => serve_image(request).await,
        RequestKind::Artifact => serve_artifact(request).await,
        RequestKind::Source => serve_source(state, request).await,
        RequestKind::Unknown => Err(ServeError::NotFound(request.path.clone())),
    }
}

async fn serve_asset_reference(request: &ModuleRequest) -> Result<Response, ServeError> {
    match tokio::fs::metadata(&request.file).await {
        Ok(meta) if meta.is_file() => Ok(respond(
            JS_CONTENT_TYPE,
            asset_url_module(&request.path),
        )),
        _ => Err(ServeError::AssetNotFound(request.file.clone())),
    }
}

async fn serve_shell(state: &DevServerState) -> Result<Response, ServeError> {
    let path = state.config.shell_path();
    let html = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ServeError::ShellUnreadable { path, source })?;
    Ok(respond(HTML_CONTENT_TYPE, inject_client_script(&html)))
}

async fn serve_stylesheet(
    state: &DevServerState,
    request: &ModuleRequest,
) -> Result<Response, ServeError> {
    let css = tokio::fs::read_to_string(&request.file)
        .await
        .map_err(|source| ServeError::read(&request.file, source, &request.path))?;
    let id = state.module_id(&request.file);
    Ok(respond(JS_CONTENT_TYPE, css_module(&id, &request.file, &css)))
}

async fn serve_image(request: &ModuleRequest) -> Result<Response, ServeError> {
    let bytes = tokio::fs::read(&request.file)
        .await
        .map_err(|source| ServeError::read(&request.file, source, &request.path))?;
    let content_type = image_mime(&request.file)
        .map(|m| m.to_string())
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
    Ok(respond(&content_type, bytes))
}

async fn serve_artifact(request: &ModuleRequest) -> Result<Response, ServeError> {
    let code = tokio::fs::read(&request.file)
        .await
        .map_err(|source| ServeError::read(&request.file, source, &request.path))?;
    Ok(respond(JS_CONTENT_TYPE, code))
}

async fn serve_source(
    state: &DevServerState,
    request: &ModuleRequest,
) -> Result<Response, ServeError> {
    let code = state
        .transpiler
        .transpile(&request.file, OutputKind::Module)
        .await
        .map_err(|err| {
            if err.is_not_found() {
                ServeError::NotFound(request.path.clone())
            } else {
                ServeError::Transform(err)
            }
        })?;

    // Build every dependency before rewriting; a failed build shows up
    // below as an unresolved import.
    let keys = dependency_keys(&code)?;
    let outcomes = join_all(keys.iter().map(|key| state.cache.ensure_built(key))).await;
    for (key, outcome) in keys.iter().zip(outcomes) {
        if let Err(err) = outcome {
            tracing::debug!(key = %key, error = %err, "dependency unavailable");
        }
    }

    let rewritten = rewrite_imports(&code, state.cache.as_ref())?;
    let id = state.module_id(&request.file);
    let mut body = hot_prelude(&id);
    body.push_str(&rewritten.code);
    Ok(respond(JS_CONTENT_TYPE, body))
}

fn respond(content_type: &str, body: impl IntoResponse) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        body,
    )
        .into_response()
}
