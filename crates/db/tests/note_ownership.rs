//! Repository-level tests for notes, participants, and the replace-all
//! board edit.

use sqlx::PgPool;
use uuid::Uuid;
use boardstorm_db::models::board::BoardDraft;
use boardstorm_db::models::note::CreateNote;
use boardstorm_db::models::participant::CreateParticipant;
use boardstorm_db::models::workshop::{CreateWorkshop, Workshop};
use boardstorm_db::repositories::{
    BoardRepo, NoteRepo, ParticipantRepo, QuestionRepo, WorkshopRepo,
};

async fn seed_workshop(pool: &PgPool, code: &str) -> Workshop {
    let workshop = WorkshopRepo::create(
        pool,
        &CreateWorkshop {
            facilitator_id: Uuid::new_v4(),
            title: "Notes".into(),
            code: code.into(),
            status: "draft".into(),
        },
    )
    .await
    .unwrap();

    BoardRepo::replace_for_workshop(
        pool,
        workshop.id,
        &[BoardDraft {
            title: "Board".into(),
            time_limit_minutes: 5,
            color_index: 0,
            questions: vec!["Q1".into(), "Q2".into()],
        }],
    )
    .await
    .unwrap();

    workshop
}

// ---------------------------------------------------------------------------
// Participant removal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn delete_with_notes_removes_notes_and_participant(pool: PgPool) {
    let workshop = seed_workshop(&pool, "NOTES1").await;
    let boards = BoardRepo::list_for_workshop(&pool, workshop.id).await.unwrap();
    let questions = QuestionRepo::list_for_board(&pool, boards[0].id).await.unwrap();

    let participant = ParticipantRepo::create(
        &pool,
        &CreateParticipant {
            workshop_id: workshop.id,
            name: "Author".into(),
            color_index: 0,
        },
    )
    .await
    .unwrap();

    for content in ["one", "two"] {
        NoteRepo::create(
            &pool,
            &CreateNote {
                question_id: questions[0].id,
                participant_id: participant.id,
                author_name: participant.name.clone(),
                content: content.into(),
                color_index: 0,
            },
        )
        .await
        .unwrap();
    }

    let removed = ParticipantRepo::delete_with_notes(&pool, participant.id)
        .await
        .unwrap();
    assert_eq!(removed, Some(2));

    let notes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE participant_id = $1")
        .bind(participant.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(notes, 0);
    assert!(ParticipantRepo::find_by_id(&pool, participant.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_with_notes_unknown_participant_is_none(pool: PgPool) {
    let removed = ParticipantRepo::delete_with_notes(&pool, Uuid::new_v4())
        .await
        .unwrap();
    assert!(removed.is_none());
}

// ---------------------------------------------------------------------------
// Replace-all board edit
// ---------------------------------------------------------------------------

/// Saving a workshop replaces the board tree wholesale and re-points the
/// active board pointer at the new first board.
#[sqlx::test(migrations = "./migrations")]
async fn replace_for_workshop_repoints_active_board(pool: PgPool) {
    let workshop = seed_workshop(&pool, "REPLC1").await;
    WorkshopRepo::activate(&pool, workshop.id).await.unwrap();
    let old_boards = BoardRepo::list_for_workshop(&pool, workshop.id).await.unwrap();

    BoardRepo::replace_for_workshop(
        &pool,
        workshop.id,
        &[BoardDraft {
            title: "Fresh".into(),
            time_limit_minutes: 7,
            color_index: 2,
            questions: vec!["New question".into()],
        }],
    )
    .await
    .unwrap();

    let new_boards = BoardRepo::list_for_workshop(&pool, workshop.id).await.unwrap();
    assert_eq!(new_boards.len(), 1);
    assert_ne!(new_boards[0].id, old_boards[0].id);

    let workshop = WorkshopRepo::find_by_id(&pool, workshop.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(workshop.active_board_id, Some(new_boards[0].id));
}

// ---------------------------------------------------------------------------
// Lookup semantics
// ---------------------------------------------------------------------------

/// `find_active_by_code` sees only active workshops; a draft's code
/// resolves to nothing.
#[sqlx::test(migrations = "./migrations")]
async fn find_active_by_code_ignores_drafts(pool: PgPool) {
    let workshop = seed_workshop(&pool, "LOOKUP").await;

    assert!(WorkshopRepo::find_active_by_code(&pool, "LOOKUP")
        .await
        .unwrap()
        .is_none());

    WorkshopRepo::activate(&pool, workshop.id).await.unwrap();

    let found = WorkshopRepo::find_active_by_code(&pool, "LOOKUP")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, workshop.id);
}

/// Question positions survive the append used by cluster import: a new
/// question lands after the existing ones.
#[sqlx::test(migrations = "./migrations")]
async fn append_to_board_extends_positions(pool: PgPool) {
    let workshop = seed_workshop(&pool, "APPND1").await;
    let boards = BoardRepo::list_for_workshop(&pool, workshop.id).await.unwrap();

    let appended = QuestionRepo::append_to_board(&pool, boards[0].id, "Imported cluster")
        .await
        .unwrap();

    let questions = QuestionRepo::list_for_board(&pool, boards[0].id).await.unwrap();
    assert_eq!(questions.last().unwrap().id, appended.id);
    assert!(appended.position > questions[0].position);
}
