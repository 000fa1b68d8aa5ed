//! Repository for the `participants` table.

use sqlx::PgPool;
use uuid::Uuid;
use boardstorm_core::types::{DbId, ParticipantId};

use crate::models::participant::{CreateParticipant, Participant};

const COLUMNS: &str = "id, workshop_id, name, color_index, joined_at";

/// Provides operations on participants.
pub struct ParticipantRepo;

impl ParticipantRepo {
    /// Insert a new participant with a freshly generated capability id.
    pub async fn create(
        pool: &PgPool,
        input: &CreateParticipant,
    ) -> Result<Participant, sqlx::Error> {
        let query = format!(
            "INSERT INTO participants (id, workshop_id, name, color_index)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(Uuid::new_v4())
            .bind(input.workshop_id)
            .bind(&input.name)
            .bind(input.color_index)
            .fetch_one(pool)
            .await
    }

    /// Find a participant only if they belong to the given workshop.
    ///
    /// The membership filter in the query itself means callers cannot
    /// accidentally trust a capability id from another workshop.
    pub async fn find_in_workshop(
        pool: &PgPool,
        participant_id: ParticipantId,
        workshop_id: DbId,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM participants WHERE id = $1 AND workshop_id = $2");
        sqlx::query_as::<_, Participant>(&query)
            .bind(participant_id)
            .bind(workshop_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        participant_id: ParticipantId,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM participants WHERE id = $1");
        sqlx::query_as::<_, Participant>(&query)
            .bind(participant_id)
            .fetch_optional(pool)
            .await
    }

    /// List a workshop's roster in join order.
    pub async fn list_for_workshop(
        pool: &PgPool,
        workshop_id: DbId,
    ) -> Result<Vec<Participant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM participants WHERE workshop_id = $1 ORDER BY joined_at ASC"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(workshop_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_workshop(pool: &PgPool, workshop_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM participants WHERE workshop_id = $1")
            .bind(workshop_id)
            .fetch_one(pool)
            .await
    }

    /// Remove a participant and every note they authored, notes first,
    /// inside one transaction.
    ///
    /// All-or-nothing: if the note delete fails the transaction rolls back
    /// and the participant row remains. Returns the number of notes
    /// removed, or `None` if the participant did not exist.
    pub async fn delete_with_notes(
        pool: &PgPool,
        participant_id: ParticipantId,
    ) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let notes = sqlx::query("DELETE FROM notes WHERE participant_id = $1")
            .bind(participant_id)
            .execute(&mut *tx)
            .await?;

        let participant = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(participant_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if participant.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(notes.rows_affected()))
    }
}
