//! Participant-facing routes.
//!
//! All of these authenticate by the bearer participant id in the query or
//! body, not by JWT; the handlers verify workshop membership on every call.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::play;
use crate::state::AppState;

/// Routes mounted at `/play`.
///
/// ```text
/// GET    /{workshop_id}/status                 -> status (poll target)
/// GET    /{workshop_id}/boards/{board_id}      -> board_snapshot
/// POST   /notes                                -> create_note
/// DELETE /notes/{id}                           -> delete_own_note
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{workshop_id}/status", get(play::status))
        .route("/{workshop_id}/boards/{board_id}", get(play::board_snapshot))
        .route("/notes", post(play::create_note))
        .route("/notes/{id}", axum::routing::delete(play::delete_own_note))
}
