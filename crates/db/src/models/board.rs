//! Board and question models.
//!
//! Boards and questions have no stable identity across facilitator edits:
//! saving a workshop replaces them wholesale (see
//! `BoardRepo::replace_for_workshop`). Anything keyed on a board or
//! question id — notes, analyses — does not survive an edit.

use serde::Serialize;
use sqlx::FromRow;
use boardstorm_core::types::DbId;

/// A board row from the `boards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Board {
    pub id: DbId,
    pub workshop_id: DbId,
    pub title: String,
    pub time_limit_minutes: i32,
    pub position: i32,
    pub color_index: i32,
}

/// DTO for one board (plus its questions) in a workshop save.
pub struct BoardDraft {
    pub title: String,
    pub time_limit_minutes: i32,
    pub color_index: i32,
    pub questions: Vec<String>,
}
