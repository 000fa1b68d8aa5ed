//! Question model.

use serde::Serialize;
use sqlx::FromRow;
use boardstorm_core::types::DbId;

/// A question row from the `questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: DbId,
    pub board_id: DbId,
    pub title: String,
    pub position: i32,
}
