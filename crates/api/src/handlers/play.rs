//! Participant-facing handlers: the polled status endpoint, the board
//! snapshot, note creation, and own-note deletion.
//!
//! Participants are numerous and anonymous, so they stay on a cheap,
//! authorization-checked pull model: every handler here takes the bearer
//! `participant_id` and re-verifies workshop membership before touching
//! anything. There is no participant push channel.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use boardstorm_core::error::CoreError;
use boardstorm_core::timer;
use boardstorm_core::types::{DbId, ParticipantId, Timestamp, COLOR_COUNT, MAX_NOTE_LENGTH};
use boardstorm_db::models::board::Board;
use boardstorm_db::models::note::{CreateNote, Note};
use boardstorm_db::models::question::Question;
use boardstorm_db::repositories::{BoardRepo, NoteRepo, ParticipantRepo, QuestionRepo, WorkshopRepo};
use boardstorm_events::{EventKind, WorkshopEvent};

use crate::authz;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query string carrying the participant's bearer capability.
#[derive(Debug, Deserialize)]
pub struct ParticipantQuery {
    pub participant_id: ParticipantId,
}

/// Response for `GET /play/{workshop_id}/status`.
///
/// Designed for polling every few seconds: a participant seeing
/// `active_board_id` differ from the board it is viewing treats that as
/// the authoritative move signal and re-fetches the board snapshot.
/// Repeated polls of unchanged state return identical payloads.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub active_board_id: Option<DbId>,
    /// Title of the active board, saving the client a second request when
    /// it needs to announce "moving to <board>".
    pub board_title: Option<String>,
    pub timer_running: bool,
    pub timer_started_at: Option<Timestamp>,
    /// Server-computed seconds left, `None` when there is no active board.
    pub remaining_seconds: Option<i32>,
    pub participant_count: i64,
}

/// Full snapshot of one board for a participant.
#[derive(Debug, Serialize)]
pub struct BoardSnapshot {
    pub workshop_id: DbId,
    pub workshop_title: String,
    pub board: Board,
    pub questions: Vec<Question>,
    pub notes: Vec<Note>,
    pub participant_count: i64,
}

/// GET /api/v1/play/{workshop_id}/status
///
/// The participant poll endpoint. Read-only and idempotent.
pub async fn status(
    State(state): State<AppState>,
    Path(workshop_id): Path<DbId>,
    Query(query): Query<ParticipantQuery>,
) -> AppResult<Json<DataResponse<StatusResponse>>> {
    // 1. Membership check before anything is revealed.
    authz::require_participant(&state.pool, workshop_id, query.participant_id).await?;

    // 2. Load the workshop row (single source of truth for board + timer).
    let workshop = WorkshopRepo::find_by_id(&state.pool, workshop_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("workshop", workshop_id)))?;

    // 3. Resolve the active board for its title and time limit.
    let board = match workshop.active_board_id {
        Some(board_id) => BoardRepo::find_in_workshop(&state.pool, board_id, workshop_id).await?,
        None => None,
    };

    let remaining = board
        .as_ref()
        .map(|b| timer::remaining_seconds(&workshop.timer(), b.time_limit_minutes, Utc::now()));

    let participant_count = ParticipantRepo::count_for_workshop(&state.pool, workshop_id).await?;

    Ok(Json(DataResponse {
        data: StatusResponse {
            active_board_id: workshop.active_board_id,
            board_title: board.map(|b| b.title),
            timer_running: workshop.timer_running,
            timer_started_at: workshop.timer_started_at,
            remaining_seconds: remaining,
            participant_count,
        },
    }))
}

/// GET /api/v1/play/{workshop_id}/boards/{board_id}
///
/// Initial (or re-fetched) board data: board, questions, notes, roster
/// size. Fetched on join and again whenever the status poll reports a new
/// active board.
pub async fn board_snapshot(
    State(state): State<AppState>,
    Path((workshop_id, board_id)): Path<(DbId, DbId)>,
    Query(query): Query<ParticipantQuery>,
) -> AppResult<Json<DataResponse<BoardSnapshot>>> {
    authz::require_participant(&state.pool, workshop_id, query.participant_id).await?;

    let workshop = WorkshopRepo::find_by_id(&state.pool, workshop_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("workshop", workshop_id)))?;

    let board = BoardRepo::find_in_workshop(&state.pool, board_id, workshop_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("board", board_id)))?;

    let questions = QuestionRepo::list_for_board(&state.pool, board_id).await?;
    let notes = NoteRepo::list_for_board(&state.pool, board_id).await?;
    let participant_count = ParticipantRepo::count_for_workshop(&state.pool, workshop_id).await?;

    Ok(Json(DataResponse {
        data: BoardSnapshot {
            workshop_id,
            workshop_title: workshop.title,
            board,
            questions,
            notes,
            participant_count,
        },
    }))
}

/// Request body for `POST /play/notes`.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub question_id: DbId,
    pub participant_id: ParticipantId,
    pub content: String,
}

/// POST /api/v1/play/notes
///
/// Create a note. The three-hop ownership chain (question → board →
/// workshop vs. the participant's workshop) is the crux: a capability id
/// from workshop A must not be able to write into workshop B's question,
/// even when that question id exists.
pub async fn create_note(
    State(state): State<AppState>,
    Json(input): Json<CreateNoteRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Note>>)> {
    // 1. Validate content locally.
    let content = input.content.trim();
    if content.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Note content must not be empty".into(),
        )));
    }
    if content.chars().count() > MAX_NOTE_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Note content must be at most {MAX_NOTE_LENGTH} characters"
        ))));
    }

    // 2. The question must exist...
    let workshop_id = authz::workshop_of_question(&state.pool, input.question_id).await?;

    // 3. ...and the participant must belong to the question's workshop.
    let participant =
        authz::require_participant(&state.pool, workshop_id, input.participant_id).await?;

    // 4. Insert. Pure insert, no serialization point — concurrent notes
    //    from many participants all succeed.
    let color_index = rand::rng().random_range(0..COLOR_COUNT);
    let note = NoteRepo::create(
        &state.pool,
        &CreateNote {
            question_id: input.question_id,
            participant_id: participant.id,
            author_name: participant.name.clone(),
            content: content.to_string(),
            color_index,
        },
    )
    .await?;

    state.event_bus.publish(
        WorkshopEvent::new(workshop_id, EventKind::NoteCreated).with_payload(
            serde_json::json!({
                "note_id": note.id,
                "question_id": note.question_id,
            }),
        ),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// DELETE /api/v1/play/notes/{note_id}
///
/// A participant may delete their own note, nobody else's.
pub async fn delete_own_note(
    State(state): State<AppState>,
    Path(note_id): Path<DbId>,
    Query(query): Query<ParticipantQuery>,
) -> AppResult<StatusCode> {
    let (note, workshop_id) = authz::resolve_note_chain(&state.pool, note_id).await?;

    // Standing: the caller must be a live participant of the note's
    // workshop, and must be the author.
    authz::require_participant(&state.pool, workshop_id, query.participant_id).await?;
    if note.participant_id != query.participant_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author may delete this note".into(),
        )));
    }

    NoteRepo::delete(&state.pool, note_id).await?;

    state.event_bus.publish(
        WorkshopEvent::new(workshop_id, EventKind::NoteDeleted)
            .with_payload(serde_json::json!({ "note_id": note_id })),
    );

    Ok(StatusCode::NO_CONTENT)
}
