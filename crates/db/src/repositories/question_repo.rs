//! Repository for the `questions` table.

use sqlx::PgPool;
use boardstorm_core::types::DbId;

use crate::models::question::Question;

const COLUMNS: &str = "id, board_id, title, position";

/// Provides operations on questions.
pub struct QuestionRepo;

impl QuestionRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Question>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM questions WHERE id = $1");
        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a board's questions in display order.
    pub async fn list_for_board(
        pool: &PgPool,
        board_id: DbId,
    ) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM questions WHERE board_id = $1 ORDER BY position ASC");
        sqlx::query_as::<_, Question>(&query)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }

    /// Find a question on a board by exact title.
    ///
    /// Used by cluster import to decide between appending to an existing
    /// bucket and creating a new one.
    pub async fn find_on_board_by_title(
        pool: &PgPool,
        board_id: DbId,
        title: &str,
    ) -> Result<Option<Question>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM questions WHERE board_id = $1 AND title = $2");
        sqlx::query_as::<_, Question>(&query)
            .bind(board_id)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Append a question to the end of a board.
    pub async fn append_to_board(
        pool: &PgPool,
        board_id: DbId,
        title: &str,
    ) -> Result<Question, sqlx::Error> {
        let query = format!(
            "INSERT INTO questions (board_id, title, position)
             VALUES ($1, $2, (
                 SELECT COALESCE(MAX(position) + 1, 0) FROM questions WHERE board_id = $1
             ))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(board_id)
            .bind(title)
            .fetch_one(pool)
            .await
    }
}
