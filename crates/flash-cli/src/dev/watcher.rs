//! Watching the dependency and source trees.
//!
//! Two roots feed one channel of [`WatchEvent`]s:
//!
//! - a package directory appearing directly under the dependency tree
//!   (`node_modules/lodash`, `node_modules/@scope/pkg`) is `DirectoryAdded`
//! - a file created or modified in the source tree is `FileChanged`
//!
//! [`WatchHandler`] turns debounced events into cache builds and update
//! notifications.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use flash_bundler::DependencyCache;
use flash_transform::{ArtifactLookup, module_id};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::dev::broadcast::{NotificationMessage, Notifier};
use crate::error::{CliError, Result, ResultExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A new package directory in the dependency tree
    DirectoryAdded(PathBuf),
    /// A source file was created or written
    FileChanged(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::DirectoryAdded(p) | Self::FileChanged(p) => p,
        }
    }
}

/// Keeps the underlying watchers alive.
pub struct ProjectWatcher {
    _watchers: Vec<RecommendedWatcher>,
}

impl ProjectWatcher {
    /// Watch both trees. A missing dependency tree is skipped with a warning;
    /// a missing source tree is an error.
    pub fn new(
        deps_root: PathBuf,
        source_root: PathBuf,
    ) -> Result<(Self, mpsc::Receiver<WatchEvent>)> {
        let metadata = std::fs::metadata(&source_root).with_path(&source_root)?;
        if !metadata.is_dir() {
            return Err(CliError::FileNotFound(source_root));
        }

        let (tx, rx) = mpsc::channel(100);
        let mut watchers = vec![spawn_watcher(
            &source_root,
            deps_root.clone(),
            source_root.clone(),
            tx.clone(),
        )?];

        if deps_root.is_dir() {
            watchers.push(spawn_watcher(&deps_root, deps_root.clone(), source_root, tx)?);
        } else {
            tracing::warn!(
                path = %deps_root.display(),
                "dependency directory missing; new packages will not be pre-bundled automatically"
            );
        }

        Ok((
            Self {
                _watchers: watchers,
            },
            rx,
        ))
    }
}

fn spawn_watcher(
    root: &Path,
    deps_root: PathBuf,
    source_root: PathBuf,
    tx: mpsc::Sender<WatchEvent>,
) -> Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            for path in &event.paths {
                let is_dir = path.is_dir();
                if let Some(change) =
                    classify_event(&event.kind, path, is_dir, &deps_root, &source_root)
                {
                    // Receiver gone means the server is shutting down
                    let _ = tx.blocking_send(change);
                }
            }
        }
        Err(err) => tracing::warn!(error = %err, "file watcher error"),
    })
    .map_err(CliError::Watch)?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(CliError::Watch)?;
    Ok(watcher)
}

/// Map one raw filesystem event path to a [`WatchEvent`], if it is one.
pub fn classify_event(
    kind: &EventKind,
    path: &Path,
    is_dir: bool,
    deps_root: &Path,
    source_root: &Path,
) -> Option<WatchEvent> {
    if let Ok(relative) = path.strip_prefix(deps_root) {
        let created_dir = matches!(kind, EventKind::Create(_)) && is_dir;
        return (created_dir && package_name(relative).is_some())
            .then(|| WatchEvent::DirectoryAdded(path.to_path_buf()));
    }

    let relative = path.strip_prefix(source_root).ok()?;
    let written = match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    };
    (written && !is_dir && !is_hidden(relative))
        .then(|| WatchEvent::FileChanged(path.to_path_buf()))
}

/// Package name for a directory relative to the dependency tree, when that
/// directory is a package root (`lodash`, `@scope/pkg`).
///
/// Dot-directories (the artifact store's `.flash` among them) are never
/// packages.
pub fn package_name(relative: &Path) -> Option<String> {
    let parts: Vec<&str> = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [name] if !name.starts_with('.') && !name.starts_with('@') => Some(name.to_string()),
        [scope, name] if scope.starts_with('@') && !name.starts_with('.') => {
            Some(format!("{}/{}", scope, name))
        }
        _ => None,
    }
}

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
    })
}

/// What the handler did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// A build for the package was started
    Building(String),
    /// The package already has an artifact
    Skipped(String),
    /// An update for the module id went out to this many clients
    Notified { file: String, clients: usize },
    Ignored,
}

/// Reacts to debounced watch events.
pub struct WatchHandler {
    root: PathBuf,
    cache: Arc<DependencyCache>,
    notifier: Arc<dyn Notifier>,
}

impl WatchHandler {
    pub fn new(root: PathBuf, cache: Arc<DependencyCache>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            root,
            cache,
            notifier,
        }
    }

    /// Handle one event. Builds run on their own task; this never waits.
    pub fn handle(&self, event: WatchEvent) -> WatchOutcome {
        match event {
            WatchEvent::DirectoryAdded(dir) => {
                let Some(name) = dir
                    .strip_prefix(self.cache.deps_root())
                    .ok()
                    .and_then(package_name)
                else {
                    return WatchOutcome::Ignored;
                };

                if self.cache.is_ready(&name) {
                    tracing::debug!(package = %name, "artifact exists; skipping pre-bundle");
                    return WatchOutcome::Skipped(name);
                }

                tracing::info!(package = %name, "new package detected; pre-bundling");
                let cache = Arc::clone(&self.cache);
                let key = name.clone();
                tokio::spawn(async move {
                    // Failures are logged by the cache and retried on next use
                    let _ = cache.ensure_built(&key).await;
                });
                WatchOutcome::Building(name)
            }
            WatchEvent::FileChanged(path) => {
                let file = module_id(&self.root, &path);
                let clients = self.notifier.notify(&NotificationMessage::update(file.clone()));
                tracing::debug!(file = %file, clients, "broadcast update");
                WatchOutcome::Notified { file, clients }
            }
        }
    }
}
