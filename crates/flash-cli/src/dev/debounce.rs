//! Trailing per-key debounce for watcher events.
//!
//! Each key keeps only its latest pending event. A new event for the same
//! key restarts that key's window; the event that survives a full window
//! quiet is forwarded. Other keys are independent.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

pub struct Debouncer<K, T> {
    window: Duration,
    pending: Arc<Mutex<HashMap<K, u64>>>,
    generation: AtomicU64,
    out: mpsc::Sender<T>,
}

impl<K, T> Debouncer<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: Send + 'static,
{
    pub fn new(window: Duration, out: mpsc::Sender<T>) -> Self {
        Self {
            window,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
            out,
        }
    }

    /// Queue `item` under `key`, replacing any pending item for that key.
    ///
    /// Must be called from within a tokio runtime.
    pub fn push(&self, key: K, item: T) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        self.pending.lock().insert(key.clone(), generation);

        let pending = Arc::clone(&self.pending);
        let out = self.out.clone();
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let latest = {
                let mut pending = pending.lock();
                if pending.get(&key) == Some(&generation) {
                    pending.remove(&key);
                    true
                } else {
                    false
                }
            };
            if latest {
                // Receiver gone means the server is shutting down
                let _ = out.send(item).await;
            }
        });
    }

    /// Number of keys with an event waiting.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_latest() {
        let (tx, mut rx) = mpsc::channel(16);
        let debouncer = Debouncer::new(WINDOW, tx);

        debouncer.push("src/app.tsx", 1);
        tokio::time::sleep(Duration::from_millis(40)).await;
        debouncer.push("src/app.tsx", 2);
        tokio::time::sleep(Duration::from_millis(40)).await;
        debouncer.push("src/app.tsx", 3);

        assert_eq!(rx.recv().await, Some(3));
        tokio::time::sleep(WINDOW * 3).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(debouncer.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let (tx, mut rx) = mpsc::channel(16);
        let debouncer = Debouncer::new(WINDOW, tx);

        debouncer.push("a", "a1");
        debouncer.push("b", "b1");
        debouncer.push("a", "a2");

        let mut seen = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        seen.sort();
        assert_eq!(seen, vec!["a2", "b1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_events_all_fire() {
        let (tx, mut rx) = mpsc::channel(16);
        let debouncer = Debouncer::new(WINDOW, tx);

        debouncer.push("a", 1);
        tokio::time::sleep(WINDOW * 2).await;
        debouncer.push("a", 2);

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
    }
}
