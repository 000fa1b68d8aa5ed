//! AI clustering and analysis handlers.
//!
//! Clustering snapshots a board's notes, asks the model to sort them into
//! the facilitator's categories, reconciles the labels, and persists the
//! result as an append-only analysis. Import turns a clustering result
//! into real questions and note moves.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use boardstorm_cluster::{ClusterRequest, NoteSnapshot};
use boardstorm_core::error::CoreError;
use boardstorm_core::types::DbId;
use boardstorm_db::models::analysis::BoardAnalysis;
use boardstorm_db::models::note::Note;
use boardstorm_db::repositories::{AnalysisRepo, BoardRepo, NoteRepo, QuestionRepo};
use boardstorm_events::{EventKind, WorkshopEvent};

use crate::authz;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Facilitator;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST .../cluster`.
#[derive(Debug, Deserialize)]
pub struct ClusterBoardRequest {
    pub categories: Vec<String>,
    #[serde(default)]
    pub context: Option<String>,
}

/// One note with its placement confidence, inside a cluster.
#[derive(Debug, Serialize)]
pub struct ClusteredNote {
    pub note: Note,
    pub confidence: f64,
}

/// One reconciled cluster in the response.
#[derive(Debug, Serialize)]
pub struct ClusterView {
    pub label: String,
    /// True when no question with this title exists on the board yet, so
    /// importing it would create a new question.
    pub is_new: bool,
    pub notes: Vec<ClusteredNote>,
}

#[derive(Debug, Serialize)]
pub struct ClusterResponse {
    pub analysis_id: DbId,
    pub clusters: Vec<ClusterView>,
}

/// Request body for `POST .../import-clusters`.
#[derive(Debug, Deserialize)]
pub struct ImportClustersRequest {
    pub clusters: Vec<ImportCluster>,
}

#[derive(Debug, Deserialize)]
pub struct ImportCluster {
    pub label: String,
    pub note_ids: Vec<DbId>,
}

#[derive(Debug, Serialize)]
pub struct ImportClustersResponse {
    pub moved_notes: usize,
    pub created_questions: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/workshops/{id}/boards/{board_id}/cluster
pub async fn cluster_board(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path((workshop_id, board_id)): Path<(DbId, DbId)>,
    Json(input): Json<ClusterBoardRequest>,
) -> AppResult<Json<DataResponse<ClusterResponse>>> {
    // 1. Ownership: facilitator → workshop → board.
    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;
    BoardRepo::find_in_workshop(&state.pool, board_id, workshop_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("board", board_id)))?;

    // 2. Snapshot the board's notes.
    let notes = NoteRepo::list_for_board(&state.pool, board_id).await?;
    if notes.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Board has no notes to cluster".into(),
        )));
    }

    let snapshots: Vec<NoteSnapshot> = notes
        .iter()
        .map(|n| NoteSnapshot {
            id: n.id,
            content: n.content.clone(),
        })
        .collect();

    // 3. Call the model; every snapshot note comes back in exactly one
    //    bucket regardless of what the model did.
    let request = ClusterRequest {
        notes: snapshots,
        categories: input.categories.clone(),
        context: input.context.clone(),
    };
    let buckets = state.cluster.cluster(&request).await?;

    // 4. Hydrate assignments back into full note rows and classify each
    //    label as existing-question or new.
    let by_id: HashMap<DbId, &Note> = notes.iter().map(|n| (n.id, n)).collect();
    let mut clusters = Vec::with_capacity(buckets.len());
    for bucket in &buckets {
        let existing =
            QuestionRepo::find_on_board_by_title(&state.pool, board_id, &bucket.label).await?;
        let cluster_notes = bucket
            .notes
            .iter()
            .filter_map(|a| {
                by_id.get(&a.note_id).map(|n| ClusteredNote {
                    note: (*n).clone(),
                    confidence: a.confidence,
                })
            })
            .collect();
        clusters.push(ClusterView {
            label: bucket.label.clone(),
            is_new: existing.is_none(),
            notes: cluster_notes,
        });
    }

    // 5. Persist the analysis as an append-only log entry.
    let content = serde_json::to_string(&clusters)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize analysis: {e}")))?;
    let analysis = AnalysisRepo::create(&state.pool, board_id, &content).await?;

    state.event_bus.publish(
        WorkshopEvent::new(workshop_id, EventKind::AnalysisCreated)
            .with_payload(serde_json::json!({ "analysis_id": analysis.id, "board_id": board_id })),
    );

    Ok(Json(DataResponse {
        data: ClusterResponse {
            analysis_id: analysis.id,
            clusters,
        },
    }))
}

/// POST /api/v1/workshops/{id}/boards/{board_id}/import-clusters
///
/// Materialize a clustering result: each label becomes (or reuses) a
/// question on the board, and its notes are moved there. Note ids that no
/// longer resolve are skipped; the facilitator may have deleted them
/// between clustering and import.
pub async fn import_clusters(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path((workshop_id, board_id)): Path<(DbId, DbId)>,
    Json(input): Json<ImportClustersRequest>,
) -> AppResult<Json<DataResponse<ImportClustersResponse>>> {
    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;
    BoardRepo::find_in_workshop(&state.pool, board_id, workshop_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("board", board_id)))?;

    let mut moved_notes = 0usize;
    let mut created_questions = 0usize;

    for cluster in &input.clusters {
        let label = cluster.label.trim();
        if label.is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Cluster labels must not be empty".into(),
            )));
        }

        let question = match QuestionRepo::find_on_board_by_title(&state.pool, board_id, label)
            .await?
        {
            Some(q) => q,
            None => {
                created_questions += 1;
                QuestionRepo::append_to_board(&state.pool, board_id, label).await?
            }
        };

        let mut cluster_moved = Vec::new();
        for note_id in &cluster.note_ids {
            if NoteRepo::move_to_question(&state.pool, *note_id, question.id)
                .await?
                .is_some()
            {
                cluster_moved.push(*note_id);
            }
        }
        moved_notes += cluster_moved.len();

        if !cluster_moved.is_empty() {
            state.event_bus.publish(
                WorkshopEvent::new(workshop_id, EventKind::NoteMoved).with_payload(
                    serde_json::json!({
                        "question_id": question.id,
                        "note_ids": cluster_moved,
                    }),
                ),
            );
        }
    }

    Ok(Json(DataResponse {
        data: ImportClustersResponse {
            moved_notes,
            created_questions,
        },
    }))
}

/// GET /api/v1/workshops/{id}/boards/{board_id}/analyses
pub async fn list_analyses(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path((workshop_id, board_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<BoardAnalysis>>>> {
    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;
    BoardRepo::find_in_workshop(&state.pool, board_id, workshop_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("board", board_id)))?;

    let analyses = AnalysisRepo::list_for_board(&state.pool, board_id).await?;
    Ok(Json(DataResponse { data: analyses }))
}

/// DELETE /api/v1/workshops/{id}/analyses/{analysis_id}
pub async fn delete_analysis(
    State(state): State<AppState>,
    facilitator: Facilitator,
    Path((workshop_id, analysis_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authz::require_workshop_owner(&state.pool, workshop_id, facilitator.id).await?;

    let analysis = AnalysisRepo::find_by_id(&state.pool, analysis_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("analysis", analysis_id)))?;

    // The analysis chain is board → workshop.
    let owner_workshop: Option<DbId> =
        sqlx::query_scalar("SELECT workshop_id FROM boards WHERE id = $1")
            .bind(analysis.board_id)
            .fetch_optional(&state.pool)
            .await?;
    if owner_workshop != Some(workshop_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Analysis does not belong to this workshop".into(),
        )));
    }

    AnalysisRepo::delete(&state.pool, analysis_id).await?;

    state.event_bus.publish(
        WorkshopEvent::new(workshop_id, EventKind::AnalysisDeleted)
            .with_payload(serde_json::json!({ "analysis_id": analysis_id })),
    );

    Ok(StatusCode::NO_CONTENT)
}
