//! Repository for the `board_analyses` table.

use sqlx::PgPool;
use boardstorm_core::types::DbId;

use crate::models::analysis::BoardAnalysis;

const COLUMNS: &str = "id, board_id, content, created_at";

/// Provides operations on stored AI analyses.
pub struct AnalysisRepo;

impl AnalysisRepo {
    /// Append an analysis to a board's log.
    pub async fn create(
        pool: &PgPool,
        board_id: DbId,
        content: &str,
    ) -> Result<BoardAnalysis, sqlx::Error> {
        let query = format!(
            "INSERT INTO board_analyses (board_id, content)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoardAnalysis>(&query)
            .bind(board_id)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// List a board's analyses, most recent first. The head of the list is
    /// the "current" analysis for display; older entries stay retrievable.
    pub async fn list_for_board(
        pool: &PgPool,
        board_id: DbId,
    ) -> Result<Vec<BoardAnalysis>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM board_analyses WHERE board_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, BoardAnalysis>(&query)
            .bind(board_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BoardAnalysis>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM board_analyses WHERE id = $1");
        sqlx::query_as::<_, BoardAnalysis>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete one analysis. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM board_analyses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
