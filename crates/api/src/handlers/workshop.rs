//! Facilitator handlers for workshop lifecycle: create/update (replace-all
//! boards), activate, advance board, timer, delete, roster.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use boardstorm_core::error::CoreError;
use boardstorm_core::join_code;
use boardstorm_core::types::{DbId, ParticipantId, Timestamp};
use boardstorm_db::models::board::{Board, BoardDraft};
use boardstorm_db::models::participant::Participant;
use boardstorm_db::models::question::Question;
use boardstorm_db::models::workshop::{CreateWorkshop, Workshop};
use boardstorm_db::repositories::{BoardRepo, ParticipantRepo, QuestionRepo, WorkshopRepo};
use boardstorm_events::{EventKind, WorkshopEvent};

use crate::authz;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Facilitator;
use crate::response::DataResponse;
use crate::state::AppState;

/// Bounds on the board/question structure of a single workshop.
const MAX_BOARDS: usize = 20;
const MAX_QUESTIONS_PER_BOARD: usize = 10;
const MAX_TITLE_LENGTH: usize = 200;
const MIN_TIME_LIMIT_MINUTES: i32 = 1;
const MAX_TIME_LIMIT_MINUTES: i32 = 180;

/// Attempts at drawing a fresh join code before giving up with a conflict.
const CODE_RETRY_ATTEMPTS: usize = 5;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One board (with questions) in a create/update request.
#[derive(Debug, Deserialize)]
pub struct BoardInput {
    pub title: String,
    pub time_limit_minutes: i32,
    #[serde(default)]
    pub color_index: i32,
    pub questions: Vec<String>,
}

/// Request body for `POST /workshops` and `PUT /workshops/{id}`.
#[derive(Debug, Deserialize)]
pub struct SaveWorkshopRequest {
    pub title: String,
    pub boards: Vec<BoardInput>,
}

/// A board with its questions, as returned to the facilitator.
#[derive(Debug, Serialize)]
pub struct BoardWithQuestions {
    #[serde(flatten)]
    pub board: Board,
    pub questions: Vec<Question>,
}

/// Full workshop detail for the facilitator.
#[derive(Debug, Serialize)]
pub struct WorkshopDetail {
    #[serde(flatten)]
    pub workshop: Workshop,
    pub boards: Vec<BoardWithQuestions>,
}

/// Request body for `POST /workshops/{id}/advance-board`.
#[derive(Debug, Deserialize)]
pub struct AdvanceBoardRequest {
    pub board_id: DbId,
}

/// Request body for `POST /workshops/{id}/timer`.
#[derive(Debug, Deserialize)]
pub struct TimerRequest {
    pub running: bool,
}

/// Timer fields echoed back after a timer or board transition.
#[derive(Debug, Serialize)]
pub struct TimerView {
    pub active_board_id: Option<DbId>,
    pub timer_running: bool,
    pub timer_started_at: Option<Timestamp>,
    pub timer_remaining_seconds: Option<i32>,
}

impl From<&Workshop> for TimerView {
    fn from(w: &Workshop) -> Self {
        Self {
            active_board_id: w.active_board_id,
            timer_running: w.timer_running,
            timer_started_at: w.timer_started_at,
            timer_remaining_seconds: w.timer_remaining_seconds,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/workshops
pub async fn list_workshops(
    State(state): State<AppState>,
    facilitator: Facilitator,
) -> AppResult<Json<DataResponse<Vec<Workshop>>>> {
    let workshops = WorkshopRepo::list_for_facilitator(&state.pool, facilitator.id).await?;
    Ok(Json(DataResponse { data: workshops }))
}

/// GET /api/v1/workshops/{id}
pub async fn get_workshop(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path(workshop_id): Path<DbId>,
) -> AppResult<Json<DataResponse<WorkshopDetail>>> {
    let workshop = authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;
    let detail = load_detail(&state, workshop).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/workshops
///
/// Create a draft workshop. The join code is generated server-side and
/// inserted optimistically; a unique-constraint collision triggers a fresh
/// draw rather than failing the request.
pub async fn create_workshop(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Json(input): Json<SaveWorkshopRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<WorkshopDetail>>)> {
    // 1. Validate the structure.
    validate_save(&input)?;

    // 2. Enforce the per-facilitator workshop limit.
    let count = WorkshopRepo::count_for_facilitator(&state.pool, facilitator.id).await?;
    if count >= state.config.limits.max_workshops_per_facilitator {
        return Err(AppError::Core(CoreError::CapacityExceeded(
            "Workshop limit reached".into(),
        )));
    }

    // 3. Insert with collision-retried code generation.
    let workshop = insert_with_unique_code(
        &state.pool,
        facilitator.id,
        input.title.trim(),
        join_code::generate,
    )
    .await?;

    // 4. Write the board/question snapshot.
    BoardRepo::replace_for_workshop(&state.pool, workshop.id, &drafts(&input)).await?;

    let detail = load_detail(&state, workshop).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// PUT /api/v1/workshops/{id}
///
/// Update title and replace all boards/questions wholesale. Board and
/// question ids do not survive a save; notes and analyses attached to the
/// old ids are removed with them. This is the documented replace-all
/// contract, not an accident.
pub async fn update_workshop(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path(workshop_id): Path<DbId>,
    Json(input): Json<SaveWorkshopRequest>,
) -> AppResult<Json<DataResponse<WorkshopDetail>>> {
    validate_save(&input)?;

    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;

    let workshop = WorkshopRepo::update_title(&state.pool, workshop_id, input.title.trim())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("workshop", workshop_id)))?;

    BoardRepo::replace_for_workshop(&state.pool, workshop_id, &drafts(&input)).await?;

    state
        .event_bus
        .publish(WorkshopEvent::new(workshop_id, EventKind::WorkshopUpdated));

    // Reload: the replace may have re-pointed the active board.
    let workshop = WorkshopRepo::find_by_id(&state.pool, workshop_id)
        .await?
        .unwrap_or(workshop);
    let detail = load_detail(&state, workshop).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/workshops/{id}/activate
///
/// Transition draft → active. Requires at least one board with at least
/// one question; the first board becomes the active board.
pub async fn activate_workshop(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path(workshop_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Workshop>>> {
    let workshop = authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;

    if workshop.is_active() {
        return Err(AppError::Core(CoreError::Conflict(
            "Workshop is already active".into(),
        )));
    }

    if !BoardRepo::any_board_has_question(&state.pool, workshop_id).await? {
        return Err(AppError::Core(CoreError::Validation(
            "Add at least one board with at least one question before starting".into(),
        )));
    }

    // Atomic conditional transition; a concurrent duplicate activation
    // loses the `status = 'draft'` guard and surfaces as a conflict.
    let workshop = WorkshopRepo::activate(&state.pool, workshop_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict("Workshop was already activated".into()))
        })?;

    state
        .event_bus
        .publish(WorkshopEvent::new(workshop_id, EventKind::WorkshopUpdated));

    Ok(Json(DataResponse { data: workshop }))
}

/// POST /api/v1/workshops/{id}/advance-board
///
/// Switch the active board. The timer reset is part of the same atomic
/// UPDATE in the repository — a stale timer can never leak into the next
/// board, and a double-click cannot advance twice.
pub async fn advance_board(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path(workshop_id): Path<DbId>,
    Json(input): Json<AdvanceBoardRequest>,
) -> AppResult<Json<DataResponse<TimerView>>> {
    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;

    // Board must exist in this workshop (404 before the conditional
    // update so the caller can tell a bad id from a lost race).
    BoardRepo::find_in_workshop(&state.pool, input.board_id, workshop_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("board", input.board_id)))?;

    let workshop = WorkshopRepo::advance_board(&state.pool, workshop_id, input.board_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Workshop is not active; start it before advancing boards".into(),
            ))
        })?;

    state.event_bus.publish(
        WorkshopEvent::new(workshop_id, EventKind::BoardAdvanced)
            .with_payload(serde_json::json!({ "board_id": input.board_id })),
    );

    Ok(Json(DataResponse {
        data: TimerView::from(&workshop),
    }))
}

/// POST /api/v1/workshops/{id}/timer
///
/// Start or stop the timer. Stopping captures the seconds left so a later
/// start resumes from the same point; both paths are single atomic
/// UPDATEs, and repeating the current state is a harmless no-op.
pub async fn set_timer(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path(workshop_id): Path<DbId>,
    Json(input): Json<TimerRequest>,
) -> AppResult<Json<DataResponse<TimerView>>> {
    let current = authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;

    if !current.is_active() {
        return Err(AppError::Core(CoreError::Conflict(
            "Workshop is not active".into(),
        )));
    }
    // An edit can replace all boards and leave the pointer empty; with no
    // active board the stop query has nothing to join, so starting would
    // wedge the timer in the running state.
    if current.active_board_id.is_none() {
        return Err(AppError::Core(CoreError::Conflict(
            "Workshop has no active board to time".into(),
        )));
    }

    let updated = if input.running {
        WorkshopRepo::start_timer(&state.pool, workshop_id).await?
    } else {
        WorkshopRepo::stop_timer(&state.pool, workshop_id).await?
    };

    // `None` means the timer was already in the requested state. Read
    // back and report as-is.
    let workshop = match updated {
        Some(w) => w,
        None => WorkshopRepo::find_by_id(&state.pool, workshop_id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::not_found("workshop", workshop_id)))?,
    };

    state.event_bus.publish(
        WorkshopEvent::new(workshop_id, EventKind::TimerUpdated).with_payload(
            serde_json::json!({ "timer_running": workshop.timer_running }),
        ),
    );

    Ok(Json(DataResponse {
        data: TimerView::from(&workshop),
    }))
}

/// DELETE /api/v1/workshops/{id}
///
/// Cascading delete: notes, analyses, questions, boards, participants,
/// then the workshop, as ordered steps in one transaction.
pub async fn delete_workshop(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path(workshop_id): Path<DbId>,
) -> AppResult<StatusCode> {
    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;
    WorkshopRepo::delete_cascade(&state.pool, workshop_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/workshops/{id}/participants
pub async fn list_participants(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path(workshop_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Participant>>>> {
    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;
    let participants = ParticipantRepo::list_for_workshop(&state.pool, workshop_id).await?;
    Ok(Json(DataResponse { data: participants }))
}

/// DELETE /api/v1/workshops/{id}/participants/{participant_id}
///
/// Remove a participant and all their notes, all-or-nothing: the notes go
/// first inside the same transaction, so a failure leaves everything in
/// place.
pub async fn delete_participant(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path((workshop_id, participant_id)): Path<(DbId, ParticipantId)>,
) -> AppResult<StatusCode> {
    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;

    let participant = ParticipantRepo::find_by_id(&state.pool, participant_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("participant", participant_id)))?;

    if participant.workshop_id != workshop_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Participant does not belong to this workshop".into(),
        )));
    }

    ParticipantRepo::delete_with_notes(&state.pool, participant_id).await?;

    state.event_bus.publish(
        WorkshopEvent::new(workshop_id, EventKind::ParticipantDeleted)
            .with_payload(serde_json::json!({ "participant_id": participant_id })),
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a workshop, drawing fresh join codes until one sticks.
///
/// The generator is injected so tests can force collisions. A draw that
/// collides with an existing code is retried up to [`CODE_RETRY_ATTEMPTS`]
/// times; other database errors propagate immediately.
pub async fn insert_with_unique_code(
    pool: &sqlx::PgPool,
    facilitator_id: boardstorm_core::types::FacilitatorId,
    title: &str,
    mut generate: impl FnMut() -> String,
) -> AppResult<Workshop> {
    for _ in 0..CODE_RETRY_ATTEMPTS {
        let input = CreateWorkshop {
            facilitator_id,
            title: title.to_string(),
            code: generate(),
            status: "draft".to_string(),
        };
        match WorkshopRepo::create(pool, &input).await {
            Ok(workshop) => return Ok(workshop),
            Err(err) if boardstorm_db::is_unique_violation(&err) => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(AppError::Core(CoreError::Conflict(
        "Could not allocate a unique join code, please retry".into(),
    )))
}

fn validate_save(input: &SaveWorkshopRequest) -> AppResult<()> {
    let title = input.title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Workshop title must be between 1 and {MAX_TITLE_LENGTH} characters"
        ))));
    }
    if input.boards.len() > MAX_BOARDS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "At most {MAX_BOARDS} boards per workshop"
        ))));
    }
    for board in &input.boards {
        let board_title = board.title.trim();
        if board_title.is_empty() || board_title.chars().count() > MAX_TITLE_LENGTH {
            return Err(AppError::Core(CoreError::Validation(
                "Board titles must be between 1 and 200 characters".into(),
            )));
        }
        if !(MIN_TIME_LIMIT_MINUTES..=MAX_TIME_LIMIT_MINUTES).contains(&board.time_limit_minutes) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Board time limit must be between {MIN_TIME_LIMIT_MINUTES} and {MAX_TIME_LIMIT_MINUTES} minutes"
            ))));
        }
        if board.questions.len() > MAX_QUESTIONS_PER_BOARD {
            return Err(AppError::Core(CoreError::Validation(format!(
                "At most {MAX_QUESTIONS_PER_BOARD} questions per board"
            ))));
        }
        if board.questions.iter().any(|q| q.trim().is_empty()) {
            return Err(AppError::Core(CoreError::Validation(
                "Question titles must not be empty".into(),
            )));
        }
    }
    Ok(())
}

fn drafts(input: &SaveWorkshopRequest) -> Vec<BoardDraft> {
    input
        .boards
        .iter()
        .map(|b| BoardDraft {
            title: b.title.trim().to_string(),
            time_limit_minutes: b.time_limit_minutes,
            color_index: b.color_index,
            questions: b.questions.iter().map(|q| q.trim().to_string()).collect(),
        })
        .collect()
}

async fn load_detail(state: &AppState, workshop: Workshop) -> AppResult<WorkshopDetail> {
    let boards = BoardRepo::list_for_workshop(&state.pool, workshop.id).await?;
    let mut with_questions = Vec::with_capacity(boards.len());
    for board in boards {
        let questions = QuestionRepo::list_for_board(&state.pool, board.id).await?;
        with_questions.push(BoardWithQuestions { board, questions });
    }
    Ok(WorkshopDetail {
        workshop,
        boards: with_questions,
    })
}
