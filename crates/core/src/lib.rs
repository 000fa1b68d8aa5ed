//! Domain primitives for the Boardstorm workshop platform.
//!
//! Pure types and functions only — no I/O. Everything that touches the
//! database or the network lives in `boardstorm-db` / `boardstorm-api`.

pub mod error;
pub mod join_code;
pub mod timer;
pub mod types;
