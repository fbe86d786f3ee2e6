//! WebSocket accept path and per-session loops.
//!
//! A peer connects to `GET /ws/{room}`; the last path segment is the opaque
//! room key. Each accepted socket gets two tasks: the read loop feeding
//! session events to the relay driver, and a writer task draining the
//! session's outbound channel into the socket sink. The read loop also
//! watches the shutdown token so cancellation runs the same disconnect
//! cleanup as a peer-initiated close.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use huddle_core::SessionEvent;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{AppState, dispatch};

/// Build the relay router: the WebSocket endpoint and a liveness probe.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws/{room}", get(ws_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn ws_handler(
    State(state): State<Arc<AppState>>,
    Path(room_key): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_session(state, socket, room_key))
}

/// Drive one session from handshake to close.
async fn handle_session(state: Arc<AppState>, socket: WebSocket, room_key: String) {
    let session_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Writer task: drains until every sender clone is gone, so payloads
    // queued before the disconnect still flush.
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sink.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    state.register_sender(session_id, tx).await;
    dispatch(&state, SessionEvent::Joined { session_id, room_key: room_key.clone() }).await;
    tracing::debug!(%session_id, %room_key, "session opened");

    loop {
        tokio::select! {
            () = state.shutdown_token().cancelled() => {
                tracing::debug!(%session_id, "session cancelled by shutdown");
                break;
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    dispatch(&state, SessionEvent::MessageReceived {
                        session_id,
                        payload: text.as_str().to_owned(),
                    })
                    .await;
                },
                Some(Ok(Message::Close(_))) | None => break,
                // Binary and ping/pong frames are outside the signaling
                // convention; ignored rather than relayed
                Some(Ok(_)) => {},
                Some(Err(err)) => {
                    tracing::debug!(%session_id, error = %err, "socket error");
                    break;
                },
            },
        }
    }

    state.unregister_sender(session_id).await;
    dispatch(&state, SessionEvent::Disconnected { session_id }).await;
    let _ = writer.await;
    tracing::debug!(%session_id, "session closed");
}
