//! Note model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use boardstorm_core::types::{DbId, ParticipantId, Timestamp};

/// A note row from the `notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: DbId,
    pub question_id: DbId,
    /// The authoring participant — never a facilitator id. Ownership checks
    /// for participant-initiated deletes compare against this field.
    pub participant_id: ParticipantId,
    pub author_name: String,
    pub content: String,
    pub color_index: i32,
    pub created_at: Timestamp,
}

/// DTO for creating a new note.
pub struct CreateNote {
    pub question_id: DbId,
    pub participant_id: ParticipantId,
    pub author_name: String,
    pub content: String,
    pub color_index: i32,
}
