//! The development server.
//!
//! - [`router`] classifies requests and produces responses
//! - [`server`] binds the HTTP and notification listeners
//! - [`watcher`] and [`debounce`] turn filesystem events into builds and
//!   update notifications
//! - [`broadcast`] fans notifications out to connected sockets
//! - [`client`] holds the browser runtime and generated module code

pub mod broadcast;
pub mod client;
pub mod debounce;
pub mod router;
pub mod server;
pub mod state;
pub mod watcher;

pub use broadcast::{NotificationMessage, Notifier, SocketHub};
pub use debounce::Debouncer;
pub use router::{ModuleRequest, RequestKind, ServeError, classify_request, dispatch};
pub use server::DevServer;
pub use state::{DevServerState, SharedState, dependency_cache};
pub use watcher::{ProjectWatcher, WatchEvent, WatchHandler, WatchOutcome};
