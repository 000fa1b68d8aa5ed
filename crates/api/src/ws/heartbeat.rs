use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

/// Spawn the heartbeat task: one Ping frame to every live facilitator
/// connection each `interval_secs` (see `WS_HEARTBEAT_SECS`).
///
/// Participants never hold a socket, so this only touches the facilitator
/// channel. The task loops until aborted; `main` holds the `JoinHandle` and
/// aborts it after `shutdown_all` has closed the connections.
pub fn start_heartbeat(ws_manager: Arc<WsManager>, interval_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick completes immediately; skip it so a fresh
        // connection is not pinged before it finishes the handshake.
        interval.tick().await;

        loop {
            interval.tick().await;
            let count = ws_manager.connection_count().await;
            if count > 0 {
                tracing::debug!(count, "WebSocket heartbeat ping");
            }
            ws_manager.ping_all().await;
        }
    })
}
