//! AI analysis model.

use serde::Serialize;
use sqlx::FromRow;
use boardstorm_core::types::{DbId, Timestamp};

/// A stored AI analysis for a board, from the `board_analyses` table.
///
/// Append-only: newer analyses never overwrite older ones. "Current" for
/// display purposes means most recent by `created_at`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BoardAnalysis {
    pub id: DbId,
    pub board_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
}
