//! Repository for the `boards` table.

use sqlx::PgPool;
use boardstorm_core::types::DbId;

use crate::models::board::{Board, BoardDraft};
use crate::models::question::Question;

const COLUMNS: &str = "id, workshop_id, title, time_limit_minutes, position, color_index";

/// Provides operations on boards.
pub struct BoardRepo;

impl BoardRepo {
    /// List a workshop's boards in display order.
    pub async fn list_for_workshop(
        pool: &PgPool,
        workshop_id: DbId,
    ) -> Result<Vec<Board>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM boards WHERE workshop_id = $1 ORDER BY position ASC"
        );
        sqlx::query_as::<_, Board>(&query)
            .bind(workshop_id)
            .fetch_all(pool)
            .await
    }

    /// Find a board only if it belongs to the given workshop.
    pub async fn find_in_workshop(
        pool: &PgPool,
        board_id: DbId,
        workshop_id: DbId,
    ) -> Result<Option<Board>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM boards WHERE id = $1 AND workshop_id = $2");
        sqlx::query_as::<_, Board>(&query)
            .bind(board_id)
            .bind(workshop_id)
            .fetch_optional(pool)
            .await
    }

    /// True if at least one board in the workshop has at least one question.
    ///
    /// Activation precondition: a workshop with no answerable question
    /// anywhere must stay in draft.
    pub async fn any_board_has_question(
        pool: &PgPool,
        workshop_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM questions q
                 JOIN boards b ON b.id = q.board_id
                 WHERE b.workshop_id = $1
             )",
        )
        .bind(workshop_id)
        .fetch_one(pool)
        .await
    }

    /// Replace a workshop's boards and questions wholesale, in one
    /// transaction.
    ///
    /// This is the deliberate replace-all-on-edit contract: boards and
    /// questions get fresh ids on every save, and notes and analyses
    /// attached to the old ids are deleted with them. If the workshop is
    /// already active, the active board pointer is re-aimed at the first
    /// new board and the timer is cleared, exactly as on activation.
    pub async fn replace_for_workshop(
        pool: &PgPool,
        workshop_id: DbId,
        drafts: &[BoardDraft],
    ) -> Result<Vec<Board>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Detach the active-board pointer so the board delete can proceed.
        sqlx::query(
            "UPDATE workshops SET
                 active_board_id = NULL,
                 timer_running = FALSE,
                 timer_started_at = NULL,
                 timer_remaining_seconds = NULL,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(workshop_id)
        .execute(&mut *tx)
        .await?;

        // Ordered teardown of the old snapshot: notes, analyses, questions,
        // boards.
        sqlx::query(
            "DELETE FROM notes WHERE question_id IN (
                 SELECT q.id FROM questions q
                 JOIN boards b ON b.id = q.board_id
                 WHERE b.workshop_id = $1
             )",
        )
        .bind(workshop_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM board_analyses WHERE board_id IN (
                 SELECT id FROM boards WHERE workshop_id = $1
             )",
        )
        .bind(workshop_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM questions WHERE board_id IN (
                 SELECT id FROM boards WHERE workshop_id = $1
             )",
        )
        .bind(workshop_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM boards WHERE workshop_id = $1")
            .bind(workshop_id)
            .execute(&mut *tx)
            .await?;

        // Insert the new snapshot.
        let mut boards = Vec::with_capacity(drafts.len());
        for (board_pos, draft) in drafts.iter().enumerate() {
            let board_query = format!(
                "INSERT INTO boards (workshop_id, title, time_limit_minutes, position, color_index)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING {COLUMNS}"
            );
            let board = sqlx::query_as::<_, Board>(&board_query)
                .bind(workshop_id)
                .bind(&draft.title)
                .bind(draft.time_limit_minutes)
                .bind(board_pos as i32)
                .bind(draft.color_index)
                .fetch_one(&mut *tx)
                .await?;

            for (question_pos, title) in draft.questions.iter().enumerate() {
                sqlx::query_as::<_, Question>(
                    "INSERT INTO questions (board_id, title, position)
                     VALUES ($1, $2, $3)
                     RETURNING id, board_id, title, position",
                )
                .bind(board.id)
                .bind(title)
                .bind(question_pos as i32)
                .fetch_one(&mut *tx)
                .await?;
            }

            boards.push(board);
        }

        // Re-point an active workshop at the first board of the new
        // snapshot.
        if let Some(first) = boards.first() {
            sqlx::query(
                "UPDATE workshops SET active_board_id = $2, updated_at = NOW()
                 WHERE id = $1 AND status = 'active'",
            )
            .bind(workshop_id)
            .bind(first.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(boards)
    }
}
