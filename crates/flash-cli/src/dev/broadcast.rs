//! Update notifications to connected browser clients.
//!
//! Each open WebSocket registers a bounded channel with the [`SocketHub`].
//! Sending never waits on a client: a full channel drops that one message
//! for that one client, and a closed channel removes the client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Per-client queue depth before messages are skipped.
const CLIENT_BUFFER: usize = 100;

/// First message every client receives after connecting.
pub const GREETING: &str = "Connected to Flash HMR Server";

/// A message pushed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NotificationMessage {
    /// A source file changed; `file` is its module id (`src/app.tsx`)
    Update { file: String },
}

impl NotificationMessage {
    pub fn update(file: impl Into<String>) -> Self {
        Self::Update { file: file.into() }
    }
}

/// `{"message":"Connected to Flash HMR Server"}`
pub fn greeting() -> String {
    serde_json::json!({ "message": GREETING }).to_string()
}

/// Anything that can fan a notification out to clients.
pub trait Notifier: Send + Sync {
    /// Deliver `message` to every open client; returns how many took it.
    fn notify(&self, message: &NotificationMessage) -> usize;
}

/// Registry of connected notification clients.
#[derive(Debug, Default)]
pub struct SocketHub {
    clients: RwLock<HashMap<usize, mpsc::Sender<String>>>,
    next_id: AtomicUsize,
}

impl SocketHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client; the receiver yields serialized messages for it.
    pub fn register(&self) -> (usize, mpsc::Receiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        self.clients.write().insert(id, tx);
        (id, rx)
    }

    pub fn unregister(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Send raw text to every client.
    fn send_all(&self, text: &str) -> usize {
        let clients: Vec<(usize, mpsc::Sender<String>)> = self
            .clients
            .read()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, tx) in clients {
            match tx.try_send(text.to_string()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(client = id, "client is not keeping up; skipped notification");
                }
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut registry = self.clients.write();
            for id in closed {
                registry.remove(&id);
            }
        }
        delivered
    }
}

impl Notifier for SocketHub {
    fn notify(&self, message: &NotificationMessage) -> usize {
        match serde_json::to_string(message) {
            Ok(text) => self.send_all(&text),
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize notification");
                0
            }
        }
    }
}
