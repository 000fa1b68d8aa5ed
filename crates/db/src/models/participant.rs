//! Participant model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use boardstorm_core::types::{DbId, ParticipantId, Timestamp};

/// A participant row from the `participants` table.
///
/// The UUID primary key doubles as the participant's bearer capability:
/// anyone holding it can act as this participant. It is generated
/// server-side at join time and never re-issued.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub workshop_id: DbId,
    pub name: String,
    pub color_index: i32,
    pub joined_at: Timestamp,
}

/// DTO for creating a new participant.
pub struct CreateParticipant {
    pub workshop_id: DbId,
    pub name: String,
    pub color_index: i32,
}
