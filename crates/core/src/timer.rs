//! Board timer arithmetic.
//!
//! The workshop row stores `timer_running`, `timer_started_at` and
//! `timer_remaining_seconds`; clients derive the countdown from those three
//! fields plus the active board's time limit. These helpers keep that
//! derivation in one tested place.

use crate::types::Timestamp;

/// Snapshot of a workshop's timer fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerState {
    pub running: bool,
    pub started_at: Option<Timestamp>,
    /// Seconds left when the timer was last stopped. `None` means the timer
    /// has never been stopped mid-run for the current board.
    pub remaining_seconds: Option<i32>,
}

impl TimerState {
    /// The cleared state a board switch resets to.
    pub fn cleared() -> Self {
        Self {
            running: false,
            started_at: None,
            remaining_seconds: None,
        }
    }
}

/// Compute the seconds currently left on the timer, clamped at zero.
///
/// - Running: budget minus elapsed since `started_at`, where the budget is
///   the captured `remaining_seconds` if the timer was previously stopped
///   mid-run, otherwise the board's full duration.
/// - Stopped: the captured `remaining_seconds`, or the full duration if the
///   timer never ran.
pub fn remaining_seconds(state: &TimerState, time_limit_minutes: i32, now: Timestamp) -> i32 {
    let full = time_limit_minutes.saturating_mul(60);
    let budget = state.remaining_seconds.unwrap_or(full);

    if state.running {
        match state.started_at {
            Some(started) => {
                let elapsed = (now - started).num_seconds();
                i64::from(budget).saturating_sub(elapsed).clamp(0, i64::from(full)) as i32
            }
            // Running without a start time should not happen; treat as a
            // freshly started timer.
            None => budget,
        }
    } else {
        budget.clamp(0, full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn stopped_timer_with_no_history_reports_full_duration() {
        let state = TimerState::cleared();
        assert_eq!(remaining_seconds(&state, 5, Utc::now()), 300);
    }

    #[test]
    fn running_timer_counts_down_from_full_duration() {
        let now = Utc::now();
        let state = TimerState {
            running: true,
            started_at: Some(now - Duration::seconds(40)),
            remaining_seconds: None,
        };
        assert_eq!(remaining_seconds(&state, 5, now), 260);
    }

    #[test]
    fn resumed_timer_counts_down_from_captured_remaining() {
        // Stopped at 120s left, restarted 30s ago: 90s, not 5*60 - 30.
        let now = Utc::now();
        let state = TimerState {
            running: true,
            started_at: Some(now - Duration::seconds(30)),
            remaining_seconds: Some(120),
        };
        assert_eq!(remaining_seconds(&state, 5, now), 90);
    }

    #[test]
    fn stopped_timer_reports_captured_remaining() {
        let state = TimerState {
            running: false,
            started_at: None,
            remaining_seconds: Some(47),
        };
        assert_eq!(remaining_seconds(&state, 5, Utc::now()), 47);
    }

    #[test]
    fn expired_timer_clamps_to_zero() {
        let now = Utc::now();
        let state = TimerState {
            running: true,
            started_at: Some(now - Duration::seconds(400)),
            remaining_seconds: None,
        };
        assert_eq!(remaining_seconds(&state, 5, now), 0);
    }
}
