//! WebSocket infrastructure for the facilitator live channel.
//!
//! Provides connection management, heartbeat monitoring, and the HTTP
//! upgrade handler used by Axum routes. Only facilitators get a push
//! channel; participants stay on the authorization-checked polling
//! endpoints.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
