//! Repository for the `notes` table.
//!
//! Note creation is insert-only with no serialization point: any number of
//! participants writing to the same question race harmlessly. `created_at`
//! gives arrival order for display; no cross-participant ordering is
//! promised.

use sqlx::PgPool;
use boardstorm_core::types::DbId;

use crate::models::note::{CreateNote, Note};

const COLUMNS: &str = "id, question_id, participant_id, author_name, content, color_index, created_at";

/// Provides operations on notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a new note, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateNote) -> Result<Note, sqlx::Error> {
        let query = format!(
            "INSERT INTO notes (question_id, participant_id, author_name, content, color_index)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(input.question_id)
            .bind(input.participant_id)
            .bind(&input.author_name)
            .bind(&input.content)
            .bind(input.color_index)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE id = $1");
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all notes on a board (across its questions) in arrival order.
    pub async fn list_for_board(pool: &PgPool, board_id: DbId) -> Result<Vec<Note>, sqlx::Error> {
        sqlx::query_as::<_, Note>(
            "SELECT n.id, n.question_id, n.participant_id, n.author_name, n.content,
                    n.color_index, n.created_at
             FROM notes n
             JOIN questions q ON q.id = n.question_id
             WHERE q.board_id = $1
             ORDER BY n.created_at ASC, n.id ASC",
        )
        .bind(board_id)
        .fetch_all(pool)
        .await
    }

    /// Re-parent a note onto a different question. Returns the updated row.
    pub async fn move_to_question(
        pool: &PgPool,
        note_id: DbId,
        question_id: DbId,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET question_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(note_id)
            .bind(question_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a note. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
