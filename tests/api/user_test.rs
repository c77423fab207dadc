//! User routes: open sign-up, self-service through ownership

use super::TestApp;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_sign_up_then_read_self() {
    let app = TestApp::spawn().await;

    let (status, created) = app
        .post(
            "/api/users",
            None,
            json!({"username": "alice", "email": "alice@example.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let created = created.unwrap();
    let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

    let token = app.token_for(id, &["user"]);
    let path = format!("/api/users/{}", id);

    let (status, me) = app.get(&path, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me.unwrap()["username"], json!("alice"));

    let (status, updated) = app.patch(&path, Some(&token), json!({"nickname": "Al"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated.unwrap()["nickname"], json!("Al"));

    let (_, stranger) = app.login(&["user"]);
    let (status, _) = app.get(&path, Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sign_up_validation_and_conflict() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .post("/api/users", None, json!({"username": "al", "email": "al@example.com"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let body = json!({"username": "carol", "email": "carol@example.com"});
    let (status, _) = app.post("/api/users", None, body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.post("/api/users", None, body).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_listing_users_needs_manage() {
    let app = TestApp::spawn().await;

    let (status, _) = app.get("/api/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, user) = app.login(&["user"]);
    let (status, _) = app.get("/api/users", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, admin) = app.login(&["super-admin"]);
    let (status, list) = app.get("/api/users?limit=5", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.unwrap()["pagination"]["limit"], json!(5));
}
