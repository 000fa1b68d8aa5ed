//! Repository for the `workshops` table.
//!
//! The workshop row is the one genuinely hot shared mutable resource in the
//! system (active board pointer + timer fields, written by one facilitator,
//! read by many pollers). Every mutation here is a single conditional
//! UPDATE — never an application-level read-modify-write — so a double-click
//! or a second open tab cannot produce a lost update.

use sqlx::PgPool;
use boardstorm_core::types::{DbId, FacilitatorId};

use crate::models::workshop::{CreateWorkshop, Workshop};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, facilitator_id, title, code, status, active_board_id, \
                        timer_running, timer_started_at, timer_remaining_seconds, \
                        created_at, updated_at";

/// Provides operations on workshops.
pub struct WorkshopRepo;

impl WorkshopRepo {
    /// Insert a new workshop with a pre-generated join code.
    ///
    /// Fails with a 23505 unique violation if the code collides; the caller
    /// regenerates and retries (see `crate::is_unique_violation`).
    pub async fn create(pool: &PgPool, input: &CreateWorkshop) -> Result<Workshop, sqlx::Error> {
        let query = format!(
            "INSERT INTO workshops (facilitator_id, title, code, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(input.facilitator_id)
            .bind(&input.title)
            .bind(&input.code)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workshops WHERE id = $1");
        sqlx::query_as::<_, Workshop>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a joinable (active) workshop by its join code.
    ///
    /// Draft workshops are invisible here: an unknown code and a
    /// not-yet-activated code both look like "no such workshop" to callers,
    /// so the join endpoint leaks nothing about draft state.
    pub async fn find_active_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workshops WHERE code = $1 AND status = 'active'");
        sqlx::query_as::<_, Workshop>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List a facilitator's workshops, newest first.
    pub async fn list_for_facilitator(
        pool: &PgPool,
        facilitator_id: FacilitatorId,
    ) -> Result<Vec<Workshop>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workshops
             WHERE facilitator_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(facilitator_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_facilitator(
        pool: &PgPool,
        facilitator_id: FacilitatorId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM workshops WHERE facilitator_id = $1")
            .bind(facilitator_id)
            .fetch_one(pool)
            .await
    }

    /// Rename a workshop. Returns the updated row, or `None` if absent.
    pub async fn update_title(
        pool: &PgPool,
        id: DbId,
        title: &str,
    ) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!(
            "UPDATE workshops SET title = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(id)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Transition draft -> active, pointing the active board at the first
    /// board and clearing the timer, all in one UPDATE.
    ///
    /// Returns `None` when the workshop is missing or already active (the
    /// `status = 'draft'` guard makes a double-submitted activation a
    /// no-op race loser, not a second transition).
    pub async fn activate(pool: &PgPool, id: DbId) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!(
            "UPDATE workshops SET
                 status = 'active',
                 active_board_id = (
                     SELECT b.id FROM boards b
                     WHERE b.workshop_id = workshops.id
                     ORDER BY b.position ASC LIMIT 1
                 ),
                 timer_running = FALSE,
                 timer_started_at = NULL,
                 timer_remaining_seconds = NULL,
                 updated_at = NOW()
             WHERE id = $1 AND status = 'draft'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Switch the active board and unconditionally clear the timer, in one
    /// atomic UPDATE.
    ///
    /// The EXISTS guard ties the target board to this workshop, so a stale
    /// or cross-workshop board id changes nothing and returns `None`. The
    /// timer reset is part of the same statement: a stale timer from the
    /// previous board can never leak into the next one.
    pub async fn advance_board(
        pool: &PgPool,
        workshop_id: DbId,
        board_id: DbId,
    ) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!(
            "UPDATE workshops w SET
                 active_board_id = $2,
                 timer_running = FALSE,
                 timer_started_at = NULL,
                 timer_remaining_seconds = NULL,
                 updated_at = NOW()
             WHERE w.id = $1
               AND w.status = 'active'
               AND EXISTS (SELECT 1 FROM boards b WHERE b.id = $2 AND b.workshop_id = w.id)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(workshop_id)
            .bind(board_id)
            .fetch_optional(pool)
            .await
    }

    /// Start the timer: set `timer_started_at = NOW()` without touching the
    /// captured remaining budget, so a stopped timer resumes from where it
    /// left off rather than from the board's full duration.
    ///
    /// Guarded on `timer_running = FALSE` and on an active board being
    /// present: with `active_board_id` NULL there is nothing to time, and
    /// `stop_timer` (which joins on the active board) could never stop it.
    /// A guard miss returns `None`.
    pub async fn start_timer(pool: &PgPool, id: DbId) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!(
            "UPDATE workshops SET
                 timer_running = TRUE,
                 timer_started_at = NOW(),
                 updated_at = NOW()
             WHERE id = $1 AND status = 'active' AND timer_running = FALSE
               AND active_board_id IS NOT NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Stop the timer, capturing the seconds left so a later start resumes
    /// from the same point.
    ///
    /// The remaining budget is computed inside the UPDATE (joined to the
    /// active board's time limit), keeping stop a single atomic write.
    /// Stopping a timer that is not running returns `None`.
    pub async fn stop_timer(pool: &PgPool, id: DbId) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!(
            "UPDATE workshops w SET
                 timer_running = FALSE,
                 timer_remaining_seconds = GREATEST(
                     0,
                     COALESCE(w.timer_remaining_seconds, b.time_limit_minutes * 60)
                         - CAST(EXTRACT(EPOCH FROM (NOW() - COALESCE(w.timer_started_at, NOW()))) AS INT)
                 ),
                 timer_started_at = NULL,
                 updated_at = NOW()
             FROM boards b
             WHERE w.id = $1
               AND b.id = w.active_board_id
               AND w.timer_running = TRUE
             RETURNING w.id, w.facilitator_id, w.title, w.code, w.status, w.active_board_id, \
                       w.timer_running, w.timer_started_at, w.timer_remaining_seconds, \
                       w.created_at, w.updated_at"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a workshop and everything under it, as explicit ordered steps
    /// inside one transaction: notes, questions, boards, participants,
    /// analyses, then the workshop row. Partial completion is impossible —
    /// the transaction either commits all steps or none.
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Detach the active-board pointer before deleting boards.
        sqlx::query("UPDATE workshops SET active_board_id = NULL WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "DELETE FROM notes WHERE question_id IN (
                 SELECT q.id FROM questions q
                 JOIN boards b ON b.id = q.board_id
                 WHERE b.workshop_id = $1
             )",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM board_analyses WHERE board_id IN (
                 SELECT id FROM boards WHERE workshop_id = $1
             )",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM questions WHERE board_id IN (
                 SELECT id FROM boards WHERE workshop_id = $1
             )",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM boards WHERE workshop_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM participants WHERE workshop_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM workshops WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
