use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, RwLock};
use boardstorm_core::error::CoreError;
use boardstorm_core::types::{DbId, FacilitatorId};
use boardstorm_events::WorkshopEvent;

use crate::auth::jwt;
use crate::authz;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for the WebSocket upgrade request.
///
/// Browsers cannot set an Authorization header on WebSocket upgrades, so
/// the facilitator token rides in the query string instead.
#[derive(Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// Messages a facilitator client may send on the socket.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Subscribe { workshop_id: DbId },
    Unsubscribe { workshop_id: DbId },
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// The token is validated before the upgrade; a bad token is rejected as
/// a plain 401 and never reaches the socket protocol.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let claims = jwt::validate_token(&query.token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, claims.sub)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the channel.
///   3. Spawns a forwarder that copies bus events for subscribed workshops
///      onto the channel.
///   4. Processes inbound subscribe/unsubscribe messages on the current
///      task, checking workshop ownership for every subscribe.
///   5. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, facilitator_id: FacilitatorId) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, facilitator_id = %facilitator_id, "WebSocket connected");

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    state
        .ws_manager
        .add(conn_id.clone(), facilitator_id, tx.clone())
        .await;

    // Workshop ids this connection has subscribed to. Shared with the
    // event forwarder; ownership is verified before insertion.
    let subscriptions: Arc<RwLock<HashSet<DbId>>> = Arc::new(RwLock::new(HashSet::new()));

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Forwarder task: copy bus events for subscribed workshops onto the
    // connection channel. A lagged receiver just skips the dropped
    // events; the client's next poll or refresh restores consistency.
    let mut bus_rx = state.event_bus.subscribe();
    let forward_subs = Arc::clone(&subscriptions);
    let forward_tx = tx.clone();
    let forward_task = tokio::spawn(async move {
        loop {
            match bus_rx.recv().await {
                Ok(event) => {
                    if !forward_subs.read().await.contains(&event.workshop_id) {
                        continue;
                    }
                    if let Some(msg) = encode_event(&event) {
                        if forward_tx.send(msg).is_err() {
                            break;
                        }
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "WebSocket forwarder lagged behind event bus");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                handle_client_message(&state, facilitator_id, &subscriptions, &tx, &text).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection and abort the helper tasks.
    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    forward_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Parse and apply one inbound client message.
///
/// Subscribing to a workshop the facilitator does not own is answered
/// with an error frame and leaves the subscription set untouched.
async fn handle_client_message(
    state: &AppState,
    facilitator_id: FacilitatorId,
    subscriptions: &Arc<RwLock<HashSet<DbId>>>,
    tx: &mpsc::UnboundedSender<Message>,
    text: &str,
) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(_) => {
            send_json(
                tx,
                serde_json::json!({ "type": "error", "message": "Unrecognized message" }),
            );
            return;
        }
    };

    match message {
        ClientMessage::Subscribe { workshop_id } => {
            match authz::require_workshop_owner(&state.pool, workshop_id, facilitator_id).await {
                Ok(_) => {
                    subscriptions.write().await.insert(workshop_id);
                    send_json(
                        tx,
                        serde_json::json!({ "type": "subscribed", "workshop_id": workshop_id }),
                    );
                }
                Err(_) => {
                    send_json(
                        tx,
                        serde_json::json!({
                            "type": "error",
                            "message": "Cannot subscribe to this workshop",
                            "workshop_id": workshop_id,
                        }),
                    );
                }
            }
        }
        ClientMessage::Unsubscribe { workshop_id } => {
            subscriptions.write().await.remove(&workshop_id);
            send_json(
                tx,
                serde_json::json!({ "type": "unsubscribed", "workshop_id": workshop_id }),
            );
        }
    }
}

fn encode_event(event: &WorkshopEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(Utf8Bytes::from(json))),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize workshop event");
            None
        }
    }
}

fn send_json(tx: &mpsc::UnboundedSender<Message>, value: serde_json::Value) {
    if let Ok(json) = serde_json::to_string(&value) {
        let _ = tx.send(Message::Text(Utf8Bytes::from(json)));
    }
}
