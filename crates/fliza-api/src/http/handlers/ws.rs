//! WebSocket handler for realtime message push.
//!
//! The `/ws/events` endpoint upgrades an HTTP connection to a WebSocket
//! scoped to one user. Once connected, the handler subscribes to the
//! message bus and forwards every insert event for that user as a JSON
//! text frame. This is the second delivery path for assistant replies;
//! the client deduplicates against the direct response exactly like the
//! orchestrator does.
//!
//! Lagged receivers (a client too slow to keep up) are handled
//! gracefully: the handler logs a warning and continues receiving.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;

use fliza_types::identity::UserId;

use crate::state::AppState;

/// Query parameters for the events endpoint.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub user_id: String,
}

/// Upgrade an HTTP request to a WebSocket connection for message events.
///
/// This is mounted at `/ws/events` in the router.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<EventsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let user_id = UserId::new(query.user_id);
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, user_id))
}

/// Core WebSocket connection handler.
///
/// Uses `tokio::select!` to multiplex between bus events and incoming
/// WebSocket frames, so client disconnects are noticed promptly even when
/// the bus is quiet.
async fn handle_ws_connection(socket: WebSocket, state: AppState, user_id: UserId) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut event_rx = state.bus.subscribe();

    loop {
        tokio::select! {
            event_result = event_rx.recv() => {
                match event_result {
                    Ok(event) => {
                        if event.user_id() != &user_id {
                            continue;
                        }
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                    // Client disconnected
                                    break;
                                }
                            }
                            Err(err) => {
                                tracing::warn!("failed to serialize MessageEvent: {err}");
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            user_id = %user_id,
                            skipped = n,
                            "WebSocket subscriber lagged, skipping {n} events"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!("WebSocket receive error: {err}");
                        break;
                    }
                    // The push channel is one-way; inbound frames are
                    // drained and ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(user_id = %user_id, "WebSocket connection closed");
}
