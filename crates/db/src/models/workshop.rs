//! Workshop model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use boardstorm_core::timer::TimerState;
use boardstorm_core::types::{DbId, FacilitatorId, Timestamp};

/// A workshop row from the `workshops` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workshop {
    pub id: DbId,
    pub facilitator_id: FacilitatorId,
    pub title: String,
    /// Six-character uppercase alphanumeric join code, globally unique.
    pub code: String,
    /// `"draft"` or `"active"` (CHECK-constrained).
    pub status: String,
    pub active_board_id: Option<DbId>,
    pub timer_running: bool,
    pub timer_started_at: Option<Timestamp>,
    pub timer_remaining_seconds: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Workshop {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// The timer fields as a [`TimerState`] for countdown arithmetic.
    pub fn timer(&self) -> TimerState {
        TimerState {
            running: self.timer_running,
            started_at: self.timer_started_at,
            remaining_seconds: self.timer_remaining_seconds,
        }
    }
}

/// DTO for creating a new workshop.
pub struct CreateWorkshop {
    pub facilitator_id: FacilitatorId,
    pub title: String,
    pub code: String,
    pub status: String,
}
