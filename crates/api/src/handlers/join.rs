//! Handler for the public join-by-code endpoint.

use axum::extract::State;
use axum::Json;
use rand::Rng;
use serde::{Deserialize, Serialize};
use boardstorm_core::error::CoreError;
use boardstorm_core::types::{DbId, ParticipantId, COLOR_COUNT};
use boardstorm_core::join_code;
use boardstorm_db::models::participant::CreateParticipant;
use boardstorm_db::repositories::{ParticipantRepo, WorkshopRepo};
use boardstorm_events::{EventKind, WorkshopEvent};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum participant display-name length.
const MAX_NAME_LENGTH: usize = 50;

/// Request body for `POST /join`.
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub code: String,
    pub name: String,
}

/// Response for a successful join. The `participant_id` is the bearer
/// capability the client stores locally; it is never re-issued.
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub participant_id: ParticipantId,
    pub workshop_id: DbId,
    pub workshop_title: String,
    pub active_board_id: Option<DbId>,
}

/// POST /api/v1/join
///
/// Public: exchange a join code plus display name for a participant
/// identity. Unknown codes and codes of not-yet-activated workshops get
/// the same 404, so the endpoint is not an enumeration oracle for drafts.
pub async fn join(
    State(state): State<AppState>,
    Json(input): Json<JoinRequest>,
) -> AppResult<Json<DataResponse<JoinResponse>>> {
    // 1. Validate inputs locally.
    let code = join_code::normalize(&input.code)?;
    let name = input.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Name must be between 1 and {MAX_NAME_LENGTH} characters"
        ))));
    }

    // 2. Resolve the workshop; draft and nonexistent look identical.
    let workshop = WorkshopRepo::find_active_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("workshop", &code)))?;

    // 3. Enforce the participant capacity limit.
    let count = ParticipantRepo::count_for_workshop(&state.pool, workshop.id).await?;
    if count >= state.config.limits.max_participants_per_workshop {
        return Err(AppError::Core(CoreError::CapacityExceeded(
            "This workshop is full".into(),
        )));
    }

    // 4. Issue the participant identity. The ThreadRng is not Send, so it
    //    must not live across the await below.
    let color_index = rand::rng().random_range(0..COLOR_COUNT);
    let participant = ParticipantRepo::create(
        &state.pool,
        &CreateParticipant {
            workshop_id: workshop.id,
            name: name.to_string(),
            color_index,
        },
    )
    .await?;

    state.event_bus.publish(
        WorkshopEvent::new(workshop.id, EventKind::ParticipantJoined).with_payload(
            serde_json::json!({
                "participant_id": participant.id,
                "name": participant.name,
            }),
        ),
    );

    Ok(Json(DataResponse {
        data: JoinResponse {
            participant_id: participant.id,
            workshop_id: workshop.id,
            workshop_title: workshop.title,
            active_board_id: workshop.active_board_id,
        },
    }))
}
