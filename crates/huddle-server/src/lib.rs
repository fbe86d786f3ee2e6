//! Huddle signaling relay server.
//!
//! Production glue around [`huddle_core`]: accepts WebSocket connections
//! with axum, runs one task per session, and executes the relay driver's
//! delivery actions over per-session outbound channels.
//!
//! # Architecture
//!
//! The [`RelayDriver`] is sans-IO; this crate owns it behind a single async
//! mutex and feeds it events from the session tasks. Processing an event and
//! pushing the resulting deliveries into recipient channels happens under
//! that lock, so every recipient observes broadcasts in driver order. The
//! channel pushes never block; actual socket writes happen in each session's
//! writer task, which preserves per-recipient FIFO.
//!
//! # Components
//!
//! - [`Server`]: bind/run entry point with graceful shutdown
//! - [`AppState`]: driver + outbound channel map shared by all sessions
//! - [`router`]: upgrade handler and per-session read/write loops

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod ws;

use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::Arc,
};

pub use error::ServerError;
pub use ws::router;
use huddle_core::{RelayAction, RelayDriver, SessionEvent};
use tokio::{
    net::TcpListener,
    sync::{Mutex, RwLock, mpsc},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Server configuration for the runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:3000")
    pub bind_address: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:3000".to_owned() }
    }
}

/// Shared state for all sessions.
pub struct AppState {
    /// The relay driver; the mutex serializes all membership mutation and
    /// broadcast ordering.
    driver: Mutex<RelayDriver>,
    /// Session ID → outbound channel. All payloads to a session go through
    /// its channel, ensuring per-recipient ordering.
    senders: RwLock<HashMap<Uuid, mpsc::UnboundedSender<String>>>,
    /// Cancelled when the process is shutting down; session loops watch it
    /// so cleanup runs for every live session.
    shutdown: CancellationToken,
}

impl AppState {
    /// Create state with an empty registry.
    pub fn new() -> Self {
        Self {
            driver: Mutex::new(RelayDriver::new()),
            senders: RwLock::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Trigger shutdown: session loops exit and run their cleanup, then the
    /// accept loop drains.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Current member count of a room.
    pub async fn member_count(&self, room_key: &str) -> usize {
        self.driver.lock().await.registry().member_count(room_key)
    }

    /// Number of rooms with at least one member.
    pub async fn room_count(&self) -> usize {
        self.driver.lock().await.registry().room_count()
    }

    pub(crate) fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub(crate) async fn register_sender(
        &self,
        session_id: Uuid,
        sender: mpsc::UnboundedSender<String>,
    ) {
        self.senders.write().await.insert(session_id, sender);
    }

    pub(crate) async fn unregister_sender(&self, session_id: Uuid) {
        self.senders.write().await.remove(&session_id);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Process one session event and execute the resulting deliveries.
///
/// A delivery whose outbound channel is gone is treated as that session's
/// disconnect: the failure never reaches the original sender, and the
/// cleanup (leave + departure notification) cascades within this same call,
/// so no half-removed member survives.
pub(crate) async fn dispatch(state: &AppState, event: SessionEvent) {
    let mut driver = state.driver.lock().await;
    let senders = state.senders.read().await;

    let mut pending = VecDeque::from([event]);
    while let Some(event) = pending.pop_front() {
        for action in driver.process_event(event) {
            match action {
                RelayAction::Deliver { session_id, payload } => {
                    let delivered =
                        senders.get(&session_id).is_some_and(|tx| tx.send(payload).is_ok());
                    if !delivered {
                        tracing::warn!(%session_id, "delivery failed, dropping session");
                        pending.push_back(SessionEvent::Disconnected { session_id });
                    }
                },
            }
        }
    }
}

/// Production huddle server.
///
/// Binds a TCP listener and serves the relay router until shutdown.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Create and bind a new server.
    pub async fn bind(config: RuntimeConfig) -> Result<Self, ServerError> {
        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            ServerError::Config(format!("invalid bind address '{}': {e}", config.bind_address))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Transport(format!("failed to bind {addr}: {e}")))?;

        Ok(Self { listener, state: Arc::new(AppState::new()) })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared state handle, for shutdown and membership introspection.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server until shutdown is triggered.
    ///
    /// Ctrl-c trips the shutdown token; every session then runs its normal
    /// disconnect cleanup before the server drains.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("listening on {}", self.listener.local_addr()?);

        let token = self.state.shutdown.clone();
        tokio::spawn({
            let token = token.clone();
            async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("shutdown signal received");
                        token.cancel();
                    },
                    Err(err) => tracing::error!(error = %err, "failed to listen for shutdown"),
                }
            }
        });

        let app = ws::router(Arc::clone(&self.state));
        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))
    }
}
