//! HTTP and notification listeners.
//!
//! The HTTP listener serves the project through the router; the
//! notification listener accepts WebSocket clients on its own port and
//! registers them with the [`SocketHub`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::dev::broadcast::{SocketHub, greeting};
use crate::dev::client::{CLIENT_SCRIPT_PATH, HMR_RUNTIME_PATH, client_script, hmr_runtime};
use crate::dev::router::{JS_CONTENT_TYPE, ModuleRequest, dispatch};
use crate::dev::state::SharedState;
use crate::error::{CliError, Result};

/// Both listeners, bound and ready to serve.
pub struct DevServer {
    http: TcpListener,
    notifications: TcpListener,
    state: SharedState,
    hub: Arc<SocketHub>,
}

impl DevServer {
    /// Bind the HTTP and notification ports from the config.
    ///
    /// Binding happens up front so a taken port fails startup instead of a
    /// background task.
    pub async fn bind(state: SharedState, hub: Arc<SocketHub>) -> Result<Self> {
        let http = bind(state.config.http_addr()?).await?;
        let notifications = bind(state.config.hmr_addr()?).await?;
        Ok(Self {
            http,
            notifications,
            state,
            hub,
        })
    }

    pub fn http_addr(&self) -> Result<SocketAddr> {
        Ok(self.http.local_addr()?)
    }

    pub fn notification_addr(&self) -> Result<SocketAddr> {
        Ok(self.notifications.local_addr()?)
    }

    /// Serve until either listener fails.
    pub async fn run(self) -> Result<()> {
        let Self {
            http,
            notifications,
            state,
            hub,
        } = self;
        let http_app = http_router(state);
        let notification_app = notification_router(hub);

        tokio::try_join!(
            async move {
                axum::serve(http, http_app)
                    .await
                    .map_err(|e| CliError::Server(format!("HTTP server stopped: {}", e)))
            },
            async move {
                axum::serve(notifications, notification_app)
                    .await
                    .map_err(|e| CliError::Server(format!("Notification server stopped: {}", e)))
            },
        )?;
        Ok(())
    }
}

async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))
}

/// Router for the HTTP listener.
pub fn http_router(state: SharedState) -> Router {
    Router::new()
        .route(CLIENT_SCRIPT_PATH, get(handle_client_script))
        .route(HMR_RUNTIME_PATH, get(handle_hmr_runtime))
        .fallback(handle_request)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Router for the notification listener.
pub fn notification_router(hub: Arc<SocketHub>) -> Router {
    Router::new()
        .route("/", get(handle_upgrade))
        .with_state(hub)
}

async fn handle_request(State(state): State<SharedState>, uri: Uri) -> Response {
    let target = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    let request = match ModuleRequest::parse(&state.config.root, target) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };

    match dispatch(&state, &request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn handle_client_script(State(state): State<SharedState>) -> impl IntoResponse {
    script_response(client_script(&state.config.hmr_url()))
}

async fn handle_hmr_runtime() -> impl IntoResponse {
    script_response(hmr_runtime().to_string())
}

fn script_response(body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, JS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

async fn handle_upgrade(ws: WebSocketUpgrade, State(hub): State<Arc<SocketHub>>) -> Response {
    ws.on_upgrade(move |socket| client_session(socket, hub))
}

/// One connected client: greet it, then forward hub messages until either
/// side goes away. Inbound messages are only logged.
async fn client_session(mut socket: WebSocket, hub: Arc<SocketHub>) {
    let (id, mut outgoing) = hub.register();
    tracing::info!(client = id, "notification client connected");

    if socket.send(Message::Text(greeting().into())).await.is_err() {
        hub.unregister(id);
        return;
    }

    loop {
        tokio::select! {
            message = outgoing.recv() => match message {
                Some(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!(client = id, message = %text.as_str(), "message from client");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::warn!(client = id, error = %err, "notification socket error");
                    break;
                }
            },
        }
    }

    hub.unregister(id);
    tracing::info!(client = id, "notification client disconnected");
}
