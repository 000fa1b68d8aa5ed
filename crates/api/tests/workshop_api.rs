//! HTTP-level integration tests for the facilitator `/workshops` endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete_auth, facilitator_token, get_auth, post_json_auth,
    put_json_auth,
};
use sqlx::PgPool;
use uuid::Uuid;

fn workshop_body(title: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "boards": [
            {
                "title": "Warm-up",
                "time_limit_minutes": 5,
                "color_index": 0,
                "questions": ["What went well?", "What didn't?"]
            },
            {
                "title": "Deep dive",
                "time_limit_minutes": 10,
                "color_index": 1,
                "questions": ["What should we change?"]
            }
        ]
    })
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_workshop_returns_draft_with_code(pool: PgPool) {
    let app = build_test_app(pool);
    let token = facilitator_token(Uuid::new_v4());

    let response = post_json_auth(app, "/api/v1/workshops", &token, workshop_body("Retro")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["title"], "Retro");
    assert_eq!(data["status"], "draft");
    assert_eq!(data["active_board_id"], serde_json::Value::Null);

    let code = data["code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

    let boards = data["boards"].as_array().unwrap();
    assert_eq!(boards.len(), 2);
    assert_eq!(boards[0]["title"], "Warm-up");
    assert_eq!(boards[0]["questions"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_workshop_requires_auth(pool: PgPool) {
    let app = build_test_app(pool);
    let response = common::post_json(app, "/api/v1/workshops", workshop_body("Retro")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_workshop_rejects_empty_title(pool: PgPool) {
    let app = build_test_app(pool);
    let token = facilitator_token(Uuid::new_v4());

    let mut body = workshop_body("  ");
    body["title"] = serde_json::json!("   ");
    let response = post_json_auth(app, "/api/v1/workshops", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_workshop_rejects_bad_time_limit(pool: PgPool) {
    let app = build_test_app(pool);
    let token = facilitator_token(Uuid::new_v4());

    let mut body = workshop_body("Retro");
    body["boards"][0]["time_limit_minutes"] = serde_json::json!(0);
    let response = post_json_auth(app, "/api/v1/workshops", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// The workshop count limit is plan capacity, not validation: it must
/// surface as 403 CAPACITY_EXCEEDED. The test config allows 3.
#[sqlx::test(migrations = "../db/migrations")]
async fn create_workshop_enforces_plan_limit(pool: PgPool) {
    let app = build_test_app(pool);
    let token = facilitator_token(Uuid::new_v4());

    for i in 0..3 {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/workshops",
            &token,
            workshop_body(&format!("Workshop {i}")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response =
        post_json_auth(app, "/api/v1/workshops", &token, workshop_body("One too many")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CAPACITY_EXCEEDED");
}

// ---------------------------------------------------------------------------
// List / get / ownership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn list_workshops_is_scoped_to_owner(pool: PgPool) {
    let app = build_test_app(pool);
    let alice = facilitator_token(Uuid::new_v4());
    let bob = facilitator_token(Uuid::new_v4());

    let response =
        post_json_auth(app.clone(), "/api/v1/workshops", &alice, workshop_body("Alice's")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(app.clone(), "/api/v1/workshops", &bob).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let response = get_auth(app, "/api/v1/workshops", &alice).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_workshop_of_other_facilitator_is_forbidden(pool: PgPool) {
    let app = build_test_app(pool);
    let alice = facilitator_token(Uuid::new_v4());
    let bob = facilitator_token(Uuid::new_v4());

    let response =
        post_json_auth(app.clone(), "/api/v1/workshops", &alice, workshop_body("Alice's")).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get_auth(app, &format!("/api/v1/workshops/{id}"), &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Update (replace-all)
// ---------------------------------------------------------------------------

/// Saving a workshop replaces the whole board/question tree; old board
/// ids must not survive.
#[sqlx::test(migrations = "../db/migrations")]
async fn update_workshop_replaces_boards(pool: PgPool) {
    let app = build_test_app(pool);
    let token = facilitator_token(Uuid::new_v4());

    let response =
        post_json_auth(app.clone(), "/api/v1/workshops", &token, workshop_body("Retro")).await;
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    let old_board_id = json["data"]["boards"][0]["id"].as_i64().unwrap();

    let new_body = serde_json::json!({
        "title": "Retro v2",
        "boards": [
            {
                "title": "Only board",
                "time_limit_minutes": 7,
                "color_index": 2,
                "questions": ["Single question"]
            }
        ]
    });
    let response =
        put_json_auth(app.clone(), &format!("/api/v1/workshops/{id}"), &token, new_body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Retro v2");
    let boards = json["data"]["boards"].as_array().unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0]["title"], "Only board");
    assert_ne!(boards[0]["id"].as_i64().unwrap(), old_board_id);
}

// ---------------------------------------------------------------------------
// Activate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn activate_requires_a_question(pool: PgPool) {
    let app = build_test_app(pool);
    let token = facilitator_token(Uuid::new_v4());

    let body = serde_json::json!({
        "title": "Empty",
        "boards": [
            { "title": "No questions", "time_limit_minutes": 5, "color_index": 0, "questions": [] }
        ]
    });
    let response = post_json_auth(app.clone(), "/api/v1/workshops", &token, body).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app,
        &format!("/api/v1/workshops/{id}/activate"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn activate_sets_first_board_active(pool: PgPool) {
    let app = build_test_app(pool);
    let token = facilitator_token(Uuid::new_v4());

    let response =
        post_json_auth(app.clone(), "/api/v1/workshops", &token, workshop_body("Retro")).await;
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    let first_board_id = json["data"]["boards"][0]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/workshops/{id}/activate"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "active");
    assert_eq!(json["data"]["active_board_id"].as_i64().unwrap(), first_board_id);

    // A second activation must not restart the session.
    let response = post_json_auth(
        app,
        &format!("/api/v1/workshops/{id}/activate"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Advance board
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn advance_board_switches_and_clears_timer(pool: PgPool) {
    let app = build_test_app(pool);
    let token = facilitator_token(Uuid::new_v4());

    let response =
        post_json_auth(app.clone(), "/api/v1/workshops", &token, workshop_body("Retro")).await;
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    let second_board_id = json["data"]["boards"][1]["id"].as_i64().unwrap();

    post_json_auth(
        app.clone(),
        &format!("/api/v1/workshops/{id}/activate"),
        &token,
        serde_json::json!({}),
    )
    .await;

    // Start the timer on the first board.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/workshops/{id}/timer"),
        &token,
        serde_json::json!({ "running": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["timer_running"], true);

    // Advancing must atomically switch the board AND reset the timer.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/workshops/{id}/advance-board"),
        &token,
        serde_json::json!({ "board_id": second_board_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["active_board_id"].as_i64().unwrap(), second_board_id);
    assert_eq!(json["data"]["timer_running"], false);
    assert_eq!(json["data"]["timer_started_at"], serde_json::Value::Null);
    assert_eq!(json["data"]["timer_remaining_seconds"], serde_json::Value::Null);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn advance_board_on_draft_is_conflict(pool: PgPool) {
    let app = build_test_app(pool);
    let token = facilitator_token(Uuid::new_v4());

    let response =
        post_json_auth(app.clone(), "/api/v1/workshops", &token, workshop_body("Retro")).await;
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    let board_id = json["data"]["boards"][0]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app,
        &format!("/api/v1/workshops/{id}/advance-board"),
        &token,
        serde_json::json!({ "board_id": board_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn advance_board_rejects_foreign_board(pool: PgPool) {
    let app = build_test_app(pool);
    let token = facilitator_token(Uuid::new_v4());

    let response =
        post_json_auth(app.clone(), "/api/v1/workshops", &token, workshop_body("First")).await;
    let json = body_json(response).await;
    let first_id = json["data"]["id"].as_i64().unwrap();

    let response =
        post_json_auth(app.clone(), "/api/v1/workshops", &token, workshop_body("Second")).await;
    let json = body_json(response).await;
    let foreign_board_id = json["data"]["boards"][0]["id"].as_i64().unwrap();

    post_json_auth(
        app.clone(),
        &format!("/api/v1/workshops/{first_id}/activate"),
        &token,
        serde_json::json!({}),
    )
    .await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/workshops/{first_id}/advance-board"),
        &token,
        serde_json::json!({ "board_id": foreign_board_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_workshop_cascades(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = facilitator_token(Uuid::new_v4());

    let response =
        post_json_auth(app.clone(), "/api/v1/workshops", &token, workshop_body("Doomed")).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/api/v1/workshops/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/workshops/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let board_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM boards WHERE workshop_id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(board_count, 0);
}
