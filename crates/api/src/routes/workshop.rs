//! Facilitator workshop routes.
//!
//! Everything here requires a facilitator JWT; per-workshop routes
//! additionally require ownership, checked in the handlers.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{analysis, note, workshop};
use crate::state::AppState;

/// Routes mounted at `/workshops`.
///
/// ```text
/// GET    /                                          -> list_workshops
/// POST   /                                          -> create_workshop
/// GET    /{id}                                      -> get_workshop
/// PUT    /{id}                                      -> update_workshop
/// DELETE /{id}                                      -> delete_workshop
/// POST   /{id}/activate                             -> activate_workshop
/// POST   /{id}/advance-board                        -> advance_board
/// POST   /{id}/timer                                -> set_timer
///
/// GET    /{id}/participants                         -> list_participants
/// DELETE /{id}/participants/{participant_id}        -> delete_participant
///
/// POST   /{id}/notes/{note_id}/move                 -> move_note
/// DELETE /{id}/notes/{note_id}                      -> delete_note
///
/// POST   /{id}/boards/{board_id}/cluster            -> cluster_board
/// POST   /{id}/boards/{board_id}/import-clusters    -> import_clusters
/// GET    /{id}/boards/{board_id}/analyses           -> list_analyses
/// DELETE /{id}/analyses/{analysis_id}               -> delete_analysis
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(workshop::list_workshops).post(workshop::create_workshop),
        )
        .route(
            "/{id}",
            get(workshop::get_workshop)
                .put(workshop::update_workshop)
                .delete(workshop::delete_workshop),
        )
        .route("/{id}/activate", post(workshop::activate_workshop))
        .route("/{id}/advance-board", post(workshop::advance_board))
        .route("/{id}/timer", post(workshop::set_timer))
        .route("/{id}/participants", get(workshop::list_participants))
        .route(
            "/{id}/participants/{participant_id}",
            delete(workshop::delete_participant),
        )
        .route("/{id}/notes/{note_id}/move", post(note::move_note))
        .route("/{id}/notes/{note_id}", delete(note::delete_note))
        .route(
            "/{id}/boards/{board_id}/cluster",
            post(analysis::cluster_board),
        )
        .route(
            "/{id}/boards/{board_id}/import-clusters",
            post(analysis::import_clusters),
        )
        .route(
            "/{id}/boards/{board_id}/analyses",
            get(analysis::list_analyses),
        )
        .route(
            "/{id}/analyses/{analysis_id}",
            delete(analysis::delete_analysis),
        )
}
