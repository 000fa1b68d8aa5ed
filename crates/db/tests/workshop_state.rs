//! Repository-level tests for the workshop state machine: the atomic
//! conditional updates behind activation, board switching, and the timer.

use sqlx::PgPool;
use uuid::Uuid;
use boardstorm_db::models::board::BoardDraft;
use boardstorm_db::models::workshop::{CreateWorkshop, Workshop};
use boardstorm_db::repositories::{BoardRepo, WorkshopRepo};

async fn seed_workshop(pool: &PgPool, code: &str) -> Workshop {
    let workshop = WorkshopRepo::create(
        pool,
        &CreateWorkshop {
            facilitator_id: Uuid::new_v4(),
            title: "State machine".into(),
            code: code.into(),
            status: "draft".into(),
        },
    )
    .await
    .unwrap();

    BoardRepo::replace_for_workshop(
        pool,
        workshop.id,
        &[
            BoardDraft {
                title: "First".into(),
                time_limit_minutes: 5,
                color_index: 0,
                questions: vec!["Q1".into()],
            },
            BoardDraft {
                title: "Second".into(),
                time_limit_minutes: 10,
                color_index: 1,
                questions: vec!["Q2".into()],
            },
        ],
    )
    .await
    .unwrap();

    workshop
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn activate_points_at_first_board_once(pool: PgPool) {
    let workshop = seed_workshop(&pool, "ACTIV1").await;
    let boards = BoardRepo::list_for_workshop(&pool, workshop.id).await.unwrap();

    let activated = WorkshopRepo::activate(&pool, workshop.id)
        .await
        .unwrap()
        .expect("draft workshop should activate");
    assert_eq!(activated.status, "active");
    assert_eq!(activated.active_board_id, Some(boards[0].id));
    assert!(!activated.timer_running);

    // The `status = 'draft'` guard makes a duplicate activation a no-op.
    let again = WorkshopRepo::activate(&pool, workshop.id).await.unwrap();
    assert!(again.is_none());
}

// ---------------------------------------------------------------------------
// Board switching
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn advance_board_is_guarded_and_clears_timer(pool: PgPool) {
    let workshop = seed_workshop(&pool, "ADVAN1").await;
    let boards = BoardRepo::list_for_workshop(&pool, workshop.id).await.unwrap();

    // Draft: nothing to advance.
    let result = WorkshopRepo::advance_board(&pool, workshop.id, boards[1].id)
        .await
        .unwrap();
    assert!(result.is_none());

    WorkshopRepo::activate(&pool, workshop.id).await.unwrap();
    WorkshopRepo::start_timer(&pool, workshop.id).await.unwrap();

    let advanced = WorkshopRepo::advance_board(&pool, workshop.id, boards[1].id)
        .await
        .unwrap()
        .expect("active workshop should advance");
    assert_eq!(advanced.active_board_id, Some(boards[1].id));
    // Timer reset rides in the same UPDATE.
    assert!(!advanced.timer_running);
    assert!(advanced.timer_started_at.is_none());
    assert!(advanced.timer_remaining_seconds.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn advance_board_rejects_foreign_board(pool: PgPool) {
    let ours = seed_workshop(&pool, "OURS01").await;
    let theirs = seed_workshop(&pool, "THEIR1").await;
    let their_boards = BoardRepo::list_for_workshop(&pool, theirs.id).await.unwrap();

    WorkshopRepo::activate(&pool, ours.id).await.unwrap();

    // The EXISTS guard ties the board to the workshop in the statement
    // itself; a cross-workshop id changes nothing.
    let result = WorkshopRepo::advance_board(&pool, ours.id, their_boards[0].id)
        .await
        .unwrap();
    assert!(result.is_none());

    let unchanged = WorkshopRepo::find_by_id(&pool, ours.id).await.unwrap().unwrap();
    let our_boards = BoardRepo::list_for_workshop(&pool, ours.id).await.unwrap();
    assert_eq!(unchanged.active_board_id, Some(our_boards[0].id));
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn timer_start_stop_resume(pool: PgPool) {
    let workshop = seed_workshop(&pool, "TIMER1").await;
    WorkshopRepo::activate(&pool, workshop.id).await.unwrap();

    let started = WorkshopRepo::start_timer(&pool, workshop.id)
        .await
        .unwrap()
        .expect("stopped timer should start");
    assert!(started.timer_running);
    assert!(started.timer_started_at.is_some());

    // Starting a running timer is a guarded no-op.
    let again = WorkshopRepo::start_timer(&pool, workshop.id).await.unwrap();
    assert!(again.is_none());

    // Stop captures the remaining budget (5 min board, almost no elapsed).
    let stopped = WorkshopRepo::stop_timer(&pool, workshop.id)
        .await
        .unwrap()
        .expect("running timer should stop");
    assert!(!stopped.timer_running);
    let captured = stopped.timer_remaining_seconds.unwrap();
    assert!((295..=300).contains(&captured), "captured {captured}");

    // Restart resumes from the captured value, not the full limit.
    let resumed = WorkshopRepo::start_timer(&pool, workshop.id)
        .await
        .unwrap()
        .unwrap();
    assert!(resumed.timer_running);
    assert_eq!(resumed.timer_remaining_seconds, Some(captured));
}

#[sqlx::test(migrations = "./migrations")]
async fn stop_timer_on_stopped_timer_is_noop(pool: PgPool) {
    let workshop = seed_workshop(&pool, "TIMER2").await;
    WorkshopRepo::activate(&pool, workshop.id).await.unwrap();

    let result = WorkshopRepo::stop_timer(&pool, workshop.id).await.unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn start_timer_requires_an_active_board(pool: PgPool) {
    let workshop = seed_workshop(&pool, "TIMER3").await;
    WorkshopRepo::activate(&pool, workshop.id).await.unwrap();

    // Replacing every board clears the active-board pointer; a start with
    // nothing to time must not go through, since the stop query joins on
    // the active board and could never bring the timer back down.
    BoardRepo::replace_for_workshop(&pool, workshop.id, &[]).await.unwrap();

    let result = WorkshopRepo::start_timer(&pool, workshop.id).await.unwrap();
    assert!(result.is_none());

    let current = WorkshopRepo::find_by_id(&pool, workshop.id)
        .await
        .unwrap()
        .expect("workshop should still exist");
    assert!(!current.timer_running);
}

// ---------------------------------------------------------------------------
// Code uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_code_is_a_unique_violation(pool: PgPool) {
    seed_workshop(&pool, "SAME01").await;

    let err = WorkshopRepo::create(
        &pool,
        &CreateWorkshop {
            facilitator_id: Uuid::new_v4(),
            title: "Copycat".into(),
            code: "SAME01".into(),
            status: "draft".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(boardstorm_db::is_unique_violation(&err));
}

// ---------------------------------------------------------------------------
// Cascade delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn delete_cascade_removes_the_whole_tree(pool: PgPool) {
    let workshop = seed_workshop(&pool, "CASCA1").await;
    WorkshopRepo::activate(&pool, workshop.id).await.unwrap();

    let deleted = WorkshopRepo::delete_cascade(&pool, workshop.id).await.unwrap();
    assert!(deleted);

    assert!(WorkshopRepo::find_by_id(&pool, workshop.id)
        .await
        .unwrap()
        .is_none());
    let boards: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM boards WHERE workshop_id = $1")
        .bind(workshop.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(boards, 0);

    // Deleting again reports nothing done.
    let deleted = WorkshopRepo::delete_cascade(&pool, workshop.id).await.unwrap();
    assert!(!deleted);
}
