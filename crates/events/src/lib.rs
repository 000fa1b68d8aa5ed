//! In-process workshop event distribution.
//!
//! Mutating API handlers publish a [`WorkshopEvent`] after every committed
//! write; the facilitator WebSocket layer subscribes and forwards events
//! for the workshops a connection watches. Participants never see this
//! channel — they converge through the polled status endpoint.

pub mod bus;

pub use bus::{EventBus, EventKind, WorkshopEvent};
