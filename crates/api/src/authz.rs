//! Authorization gateway.
//!
//! Every mutating or cross-entity-reading operation resolves the actor's
//! claimed identity against the entity it targets and walks the minimum
//! ownership chain (workshop → board → question → note, or workshop →
//! participant), confirming equality at each hop. The storage layer has no
//! row-level enforcement reachable by an anonymous participant credential,
//! so these checks are the entire security boundary and must run
//! server-side on every call.
//!
//! Failure vocabulary: a broken chain is `Forbidden`; an entity that does
//! not exist at all is `NotFound`. The join endpoint alone collapses both
//! into `NotFound` so join codes cannot be enumerated.

use sqlx::PgPool;
use boardstorm_core::error::CoreError;
use boardstorm_core::types::{DbId, FacilitatorId, ParticipantId};
use boardstorm_db::models::note::Note;
use boardstorm_db::models::participant::Participant;
use boardstorm_db::models::question::Question;
use boardstorm_db::models::workshop::Workshop;
use boardstorm_db::repositories::{NoteRepo, ParticipantRepo, WorkshopRepo};

use crate::error::{AppError, AppResult};

/// Resolve a workshop and require that the facilitator owns it.
pub async fn require_workshop_owner(
    pool: &PgPool,
    workshop_id: DbId,
    facilitator_id: FacilitatorId,
) -> AppResult<Workshop> {
    let workshop = WorkshopRepo::find_by_id(pool, workshop_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("workshop", workshop_id)))?;

    if workshop.facilitator_id != facilitator_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this workshop".into(),
        )));
    }
    Ok(workshop)
}

/// Resolve a participant and require membership in the given workshop.
///
/// A capability id from another workshop (or a fabricated one) fails here
/// with `Forbidden` before any workshop data is touched.
pub async fn require_participant(
    pool: &PgPool,
    workshop_id: DbId,
    participant_id: ParticipantId,
) -> AppResult<Participant> {
    ParticipantRepo::find_in_workshop(pool, participant_id, workshop_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Not a participant of this workshop".into(),
            ))
        })
}

/// Resolve a question and require that its board belongs to the given
/// workshop.
///
/// Distinguishes "no such question" (`NotFound`) from "question exists in
/// a different workshop" (`Forbidden`): the caller has already proven
/// standing in `workshop_id`, so revealing question existence leaks
/// nothing they could not learn otherwise.
pub async fn require_question_in_workshop(
    pool: &PgPool,
    question_id: DbId,
    workshop_id: DbId,
) -> AppResult<Question> {
    let question = sqlx::query_as::<_, Question>(
        "SELECT id, board_id, title, position FROM questions WHERE id = $1",
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Core(CoreError::not_found("question", question_id)))?;

    let owner_workshop: Option<DbId> = sqlx::query_scalar(
        "SELECT b.workshop_id FROM boards b WHERE b.id = $1",
    )
    .bind(question.board_id)
    .fetch_optional(pool)
    .await?;

    if owner_workshop != Some(workshop_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Question does not belong to this workshop".into(),
        )));
    }
    Ok(question)
}

/// Resolve the workshop a question ultimately belongs to, in one hop-walk
/// query. `NotFound` when the question does not exist.
pub async fn workshop_of_question(pool: &PgPool, question_id: DbId) -> AppResult<DbId> {
    sqlx::query_scalar(
        "SELECT b.workshop_id
         FROM questions q
         JOIN boards b ON b.id = q.board_id
         WHERE q.id = $1",
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Core(CoreError::not_found("question", question_id)))
}

/// Resolve a note together with the workshop its question chain leads to.
///
/// The full three-hop walk (note → question → board → workshop) in one
/// query; `NotFound` when the note does not exist.
pub async fn resolve_note_chain(pool: &PgPool, note_id: DbId) -> AppResult<(Note, DbId)> {
    let note = NoteRepo::find_by_id(pool, note_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("note", note_id)))?;

    let workshop_id = workshop_of_question(pool, note.question_id).await?;
    Ok((note, workshop_id))
}
