pub mod health;
pub mod join;
pub mod play;
pub mod workshop;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                              facilitator WebSocket
///
/// /join                                            join by code (public)
///
/// /play/{workshop_id}/status                       participant status poll
/// /play/{workshop_id}/boards/{board_id}            participant board snapshot
/// /play/notes                                      participant note create
/// /play/notes/{id}                                 participant note delete
///
/// /workshops                                       list, create
/// /workshops/{id}                                  get, update, delete
/// /workshops/{id}/activate                         draft -> active
/// /workshops/{id}/advance-board                    switch active board
/// /workshops/{id}/timer                            start/stop timer
/// /workshops/{id}/participants                     roster, delete participant
/// /workshops/{id}/notes/{note_id}                  move, delete
/// /workshops/{id}/boards/{board_id}/cluster        AI clustering
/// /workshops/{id}/boards/{board_id}/import-clusters  materialize clusters
/// /workshops/{id}/boards/{board_id}/analyses       analysis log
/// /workshops/{id}/analyses/{analysis_id}           delete analysis
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Facilitator WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        // Public join-by-code (issues a participant identity).
        .nest("/join", join::router())
        // Participant pull surface: status poll, snapshots, own notes.
        .nest("/play", play::router())
        // Facilitator surface: workshop CRUD, session control, clustering.
        .nest("/workshops", workshop::router())
}
