use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use boardstorm_core::types::{FacilitatorId, Timestamp};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// The authenticated facilitator behind this connection. Connections
    /// are never anonymous; the token is checked before the upgrade.
    pub facilitator_id: FacilitatorId,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// The caller owns the channel; the manager keeps the sender half so
    /// heartbeat and shutdown can reach every connection.
    pub async fn add(&self, conn_id: String, facilitator_id: FacilitatorId, sender: WsSender) {
        let conn = WsConnection {
            facilitator_id,
            sender,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a message to all connections belonging to a facilitator.
    ///
    /// Returns the number of connections the message was sent to. A
    /// facilitator with two open tabs counts twice.
    pub async fn send_to_facilitator(&self, facilitator_id: FacilitatorId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if conn.facilitator_id == facilitator_id {
                let _ = conn.sender.send(message.clone());
                count += 1;
            }
        }
        count
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ws::Message;
    use uuid::Uuid;

    #[tokio::test]
    async fn add_and_remove_tracks_count() {
        let manager = WsManager::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        manager.add("conn-1".into(), Uuid::new_v4(), tx).await;
        assert_eq!(manager.connection_count().await, 1);

        manager.remove("conn-1").await;
        assert_eq!(manager.connection_count().await, 0);
    }

    #[tokio::test]
    async fn send_to_facilitator_hits_every_tab() {
        let manager = WsManager::new();
        let facilitator = Uuid::new_v4();
        let other = Uuid::new_v4();

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        manager.add("tab-1".into(), facilitator, tx1).await;
        manager.add("tab-2".into(), facilitator, tx2).await;
        manager.add("other".into(), other, tx3).await;

        let sent = manager
            .send_to_facilitator(facilitator, Message::Text("hello".into()))
            .await;
        assert_eq!(sent, 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        assert!(rx3.try_recv().is_err());
    }

    #[tokio::test]
    async fn shutdown_all_closes_and_clears() {
        let manager = WsManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.add("conn".into(), Uuid::new_v4(), tx).await;

        manager.shutdown_all().await;
        assert_eq!(manager.connection_count().await, 0);
        assert!(matches!(rx.try_recv(), Ok(Message::Close(None))));
    }
}
