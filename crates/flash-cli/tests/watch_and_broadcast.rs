//! Debounced watch events driving the dependency cache and notifications.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use flash_bundler::{ArtifactStore, BuildStatus, DependencyBundler, DependencyCache};
use flash_cli::dev::{
    Debouncer, NotificationMessage, Notifier, WatchEvent, WatchHandler, WatchOutcome,
};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::mpsc;

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<NotificationMessage>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &NotificationMessage) -> usize {
        self.sent.lock().push(message.clone());
        1
    }
}

/// Writes a stub artifact and counts calls.
#[derive(Default)]
struct StubBundler {
    calls: AtomicUsize,
}

#[async_trait]
impl DependencyBundler for StubBundler {
    async fn bundle(
        &self,
        _key: &str,
        _entry: &Path,
        artifact: &Path,
    ) -> flash_bundler::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        std::fs::write(artifact, "export default {};\n").unwrap();
        Ok(())
    }
}

struct Fixture {
    _temp: TempDir,
    root: PathBuf,
    deps: PathBuf,
    cache: Arc<DependencyCache>,
    bundler: Arc<StubBundler>,
    notifier: Arc<RecordingNotifier>,
    handler: WatchHandler,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let deps = root.join("node_modules");
    std::fs::create_dir_all(&deps).unwrap();

    let bundler = Arc::new(StubBundler::default());
    let store = ArtifactStore::new(deps.join(".flash/deps"), "/node_modules/.flash/deps");
    let cache = Arc::new(DependencyCache::new(&deps, store, bundler.clone()));
    let notifier = Arc::new(RecordingNotifier::default());
    let handler = WatchHandler::new(root.clone(), Arc::clone(&cache), notifier.clone());

    Fixture {
        _temp: temp,
        root,
        deps,
        cache,
        bundler,
        notifier,
        handler,
    }
}

fn install(deps: &Path, package: &str) -> PathBuf {
    let dir = deps.join(package);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.js"), "module.exports = {};\n").unwrap();
    dir
}

async fn wait_until_ready(cache: &DependencyCache, key: &str) {
    for _ in 0..100 {
        if cache.entry(key).status == BuildStatus::Ready {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{key} never became ready");
}

#[tokio::test]
async fn new_package_directory_triggers_build() {
    let fx = fixture();
    let dir = install(&fx.deps, "left-pad");

    let outcome = fx.handler.handle(WatchEvent::DirectoryAdded(dir));
    assert_eq!(outcome, WatchOutcome::Building("left-pad".to_string()));

    wait_until_ready(&fx.cache, "left-pad").await;
    assert_eq!(fx.bundler.calls.load(Ordering::SeqCst), 1);
    assert!(fx.notifier.sent.lock().is_empty());
}

#[tokio::test]
async fn scoped_package_directory_builds_under_full_name() {
    let fx = fixture();
    let dir = install(&fx.deps, "@scope/widgets");

    let outcome = fx.handler.handle(WatchEvent::DirectoryAdded(dir));
    assert_eq!(outcome, WatchOutcome::Building("@scope/widgets".to_string()));
    wait_until_ready(&fx.cache, "@scope/widgets").await;
    assert!(fx.cache.store().path("@scope/widgets").ends_with("@scope_widgets.js"));
}

#[tokio::test]
async fn package_with_artifact_is_skipped() {
    let fx = fixture();
    let dir = install(&fx.deps, "left-pad");
    fx.cache.ensure_built("left-pad").await.unwrap();

    let outcome = fx.handler.handle(WatchEvent::DirectoryAdded(dir));
    assert_eq!(outcome, WatchOutcome::Skipped("left-pad".to_string()));
    assert_eq!(fx.bundler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn source_change_broadcasts_module_id() {
    let fx = fixture();

    let outcome = fx
        .handler
        .handle(WatchEvent::FileChanged(fx.root.join("src").join("App.tsx")));
    assert_eq!(
        outcome,
        WatchOutcome::Notified {
            file: "src/app.tsx".to_string(),
            clients: 1
        }
    );
    assert_eq!(
        *fx.notifier.sent.lock(),
        vec![NotificationMessage::update("src/app.tsx")]
    );
}

#[tokio::test(start_paused = true)]
async fn burst_of_saves_notifies_once() {
    let fx = fixture();
    let (tx, mut rx) = mpsc::channel(16);
    let debouncer = Debouncer::new(Duration::from_millis(100), tx);

    let path = fx.root.join("src/app.tsx");
    for _ in 0..5 {
        debouncer.push(path.clone(), WatchEvent::FileChanged(path.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let event = rx.recv().await.unwrap();
    fx.handler.handle(event);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(fx.notifier.sent.lock().len(), 1);
}
