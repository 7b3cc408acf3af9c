//! The resolved dev server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Directory under the dependency tree that holds pre-bundled artifacts.
const ARTIFACT_SUBDIR: &str = ".flash/deps";

/// Dev server configuration.
///
/// All relative paths are interpreted against [`FlashConfig::root`], which
/// the loader makes absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Project root; request URLs resolve against it
    pub root: PathBuf,

    /// Host both listeners bind to
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// Notification channel (WebSocket) port
    pub hmr_port: u16,

    /// Source tree watched for changes
    pub src_dir: PathBuf,

    /// Installed-dependency tree
    pub deps_dir: PathBuf,

    /// HTML shell served at `/`
    pub html_shell: PathBuf,

    /// Debounce window for filesystem events
    pub debounce_ms: u64,

    /// Syntax lowering target handed to the transpiler
    pub target: String,

    /// Inline source maps into transformed modules
    pub sourcemap: bool,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            host: "localhost".to_string(),
            port: 5000,
            hmr_port: 4000,
            src_dir: PathBuf::from("src"),
            deps_dir: PathBuf::from("node_modules"),
            html_shell: PathBuf::from("index.html"),
            debounce_ms: 100,
            target: "es2020".to_string(),
            sourcemap: true,
        }
    }
}

impl FlashConfig {
    /// Configuration rooted at `root` with every other field defaulted.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Absolute path of the watched source tree.
    pub fn source_root(&self) -> PathBuf {
        self.resolve(&self.src_dir)
    }

    /// Absolute path of the installed-dependency tree.
    pub fn deps_root(&self) -> PathBuf {
        self.resolve(&self.deps_dir)
    }

    /// Absolute path of the artifact store (`<deps>/.flash/deps`).
    pub fn artifact_dir(&self) -> PathBuf {
        self.deps_root().join(ARTIFACT_SUBDIR)
    }

    /// Server path the artifact store is reachable under
    /// (`/node_modules/.flash/deps` by default).
    ///
    /// The dependency tree must sit inside the project root to be served.
    pub fn artifact_url_base(&self) -> Result<String> {
        let dir = self.artifact_dir();
        let relative = dir.strip_prefix(&self.root).map_err(|_| {
            ConfigError::invalid(
                "deps_dir",
                self.deps_dir.display(),
                "Place the dependency directory inside the project root",
            )
        })?;

        let segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Ok(format!("/{}", segments.join("/")))
    }

    /// Absolute path of the HTML shell.
    pub fn shell_path(&self) -> PathBuf {
        self.resolve(&self.html_shell)
    }

    /// Socket address for the HTTP listener.
    pub fn http_addr(&self) -> Result<SocketAddr> {
        self.socket_addr(self.port, "port")
    }

    /// Socket address for the notification listener.
    pub fn hmr_addr(&self) -> Result<SocketAddr> {
        self.socket_addr(self.hmr_port, "hmr_port")
    }

    fn socket_addr(&self, port: u16, field: &str) -> Result<SocketAddr> {
        let host = if self.host == "localhost" {
            "127.0.0.1"
        } else {
            self.host.as_str()
        };
        format!("{}:{}", host, port).parse().map_err(|_| {
            ConfigError::invalid(
                field,
                format!("{}:{}", self.host, port),
                "Use an IP address or 'localhost' for host",
            )
        })
    }

    /// URL the browser opens.
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// URL the notification client connects to.
    pub fn hmr_url(&self) -> String {
        format!("ws://{}:{}", self.host, self.hmr_port)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(ConfigError::RootNotFound(self.root.clone()));
        }

        if self.port == self.hmr_port {
            return Err(ConfigError::invalid(
                "hmr_port",
                self.hmr_port,
                "The notification channel needs its own port, distinct from 'port'",
            ));
        }

        if self.debounce_ms == 0 {
            return Err(ConfigError::invalid(
                "debounce_ms",
                0,
                "Use a positive window; 100 is a good default",
            ));
        }

        if self.target.trim().is_empty() {
            return Err(ConfigError::invalid(
                "target",
                "\"\"",
                "Set a target such as 'es2020' or 'esnext'",
            ));
        }

        Ok(())
    }
}
