//! Facilitator-side note handlers: moving a note between questions and
//! deleting any note in an owned workshop.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use boardstorm_core::error::CoreError;
use boardstorm_core::types::DbId;
use boardstorm_db::models::note::Note;
use boardstorm_db::repositories::NoteRepo;
use boardstorm_events::{EventKind, WorkshopEvent};

use crate::authz;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Facilitator;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /workshops/{id}/notes/{note_id}/move`.
#[derive(Debug, Deserialize)]
pub struct MoveNoteRequest {
    pub question_id: DbId,
}

/// POST /api/v1/workshops/{id}/notes/{note_id}/move
///
/// Re-parent a note onto another question. Authorization is anchored on
/// the TARGET question: the facilitator must own the workshop named in
/// the path, and the target question must live inside it. The note's
/// current location is not checked against the path workshop.
pub async fn move_note(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path((workshop_id, note_id)): Path<(DbId, DbId)>,
    Json(input): Json<MoveNoteRequest>,
) -> AppResult<Json<DataResponse<Note>>> {
    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;
    authz::require_question_in_workshop(&state.pool, input.question_id, workshop_id).await?;

    let note = NoteRepo::move_to_question(&state.pool, note_id, input.question_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("note", note_id)))?;

    state.event_bus.publish(
        WorkshopEvent::new(workshop_id, EventKind::NoteMoved).with_payload(serde_json::json!({
            "note_id": note.id,
            "question_id": note.question_id,
        })),
    );

    Ok(Json(DataResponse { data: note }))
}

/// DELETE /api/v1/workshops/{id}/notes/{note_id}
///
/// Remove any note in an owned workshop. Unlike `move_note`, deletion
/// walks the note's own chain and insists it terminates at the path
/// workshop.
pub async fn delete_note(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path((workshop_id, note_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;

    let (note, chain_workshop_id) = authz::resolve_note_chain(&state.pool, note_id).await?;
    if chain_workshop_id != workshop_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Note does not belong to this workshop".into(),
        )));
    }

    NoteRepo::delete(&state.pool, note.id).await?;

    state.event_bus.publish(
        WorkshopEvent::new(workshop_id, EventKind::NoteDeleted)
            .with_payload(serde_json::json!({ "note_id": note.id })),
    );

    Ok(StatusCode::NO_CONTENT)
}
