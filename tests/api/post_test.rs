//! Post routes: manifest-driven binding, permissions and ownership

use super::{test_configure, TestApp};
use axum::http::StatusCode;
use folio_core::domain::{MemoryRecordStore, RecordService, SubjectStore};
use folio_core::domains;
use folio_core::module::{FeatureDescriptor, Provider, Registration};
use folio_core::restful::{
    manifest_factory, ActionOption, BaseController, RestfulResource, RouteManifest,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

/// A `post` resource exposing only list and detail.
async fn read_only_posts() -> TestApp {
    let mut registry = domains::registry();
    registry.register_sync("blog", |_, _| {
        let store = Arc::new(MemoryRecordStore::new());
        let service = Arc::new(RecordService::new("post", store.clone()));
        let controller = Arc::new(BaseController::new("post", "/posts", service));
        Ok(FeatureDescriptor::new()
            .provide(Provider::value("blog.store", SubjectStore::new("post", store)))
            .provide(Provider::value(
                "blog.restful",
                RestfulResource::new(
                    controller,
                    manifest_factory(|_| async {
                        Ok(RouteManifest::new("post")
                            .action("list", ActionOption::new().guest())
                            .action("detail", ActionOption::new().guest()))
                    }),
                ),
            )))
    });

    TestApp::boot(
        &registry,
        test_configure(&[]),
        &[
            Registration::from("rbac"),
            Registration::from("restful"),
            Registration::from("blog"),
        ],
        None,
    )
    .await
}

#[tokio::test]
async fn test_disabled_action_is_not_routed() {
    let app = read_only_posts().await;
    let (_, token) = app.login(&["super-admin"]);

    let (status, body) = app.get("/api/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["pagination"]["total"], json!(0));

    let (status, _) = app
        .delete("/api/posts", Some(&token), json!({"items": [uuid::Uuid::new_v4()]}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post("/api/posts", Some(&token), json!({"title": "x"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let rows = app.app.restful().unwrap().describe();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_store_requires_create_permission() {
    let app = TestApp::spawn().await;
    let body = json!({"title": "Hello", "body": "First post"});

    let (status, _) = app.post("/api/posts", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, reader) = app.login(&["user"]);
    let (status, _) = app.post("/api/posts", Some(&reader), body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (author_id, author) = app.login(&["post-author"]);
    let (status, created) = app.post("/api/posts", Some(&author), body).await;
    assert_eq!(status, StatusCode::CREATED);
    let created = created.unwrap();
    assert_eq!(created["owner_id"], json!(author_id));
    assert_eq!(created["type"], json!("markdown"));
}

#[tokio::test]
async fn test_update_needs_ownership_or_permission() {
    let app = TestApp::spawn().await;
    let (_, author) = app.login(&["post-author"]);
    let (_, created) = app
        .post("/api/posts", Some(&author), json!({"title": "Mine", "body": "b"}))
        .await;
    let id = created.unwrap()["id"].as_str().unwrap().to_string();
    let path = format!("/api/posts/{}", id);

    let (_, stranger) = app.login(&["post-author"]);
    let (status, _) = app.patch(&path, Some(&stranger), json!({"title": "Theirs"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app.patch(&path, Some(&author), json!({"title": "Still mine"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated.unwrap()["title"], json!("Still mine"));

    let (_, manager) = app.login(&["content-manager"]);
    let (status, _) = app.patch(&path, Some(&manager), json!({"publish": true})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_drafts_are_visible_to_their_author_only() {
    let app = TestApp::spawn().await;
    let (_, author) = app.login(&["post-author"]);
    let (_, created) = app
        .post("/api/posts", Some(&author), json!({"title": "Draft", "body": "b"}))
        .await;
    let id = created.unwrap()["id"].as_str().unwrap().to_string();

    let (_, list) = app.get("/api/posts", None).await;
    assert_eq!(list.unwrap()["pagination"]["total"], json!(0));
    let (status, _) = app.get(&format!("/api/posts/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get("/api/posts", Some(&author)).await;
    assert_eq!(list.unwrap()["pagination"]["total"], json!(1));
    let (status, _) = app.get(&format!("/api/posts/{}", id), Some(&author)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_owner_deletes_to_trash() {
    let app = TestApp::spawn().await;
    let (_, author) = app.login(&["post-author"]);
    let (_, created) = app
        .post(
            "/api/posts",
            Some(&author),
            json!({"title": "Bye", "body": "b", "publish": true}),
        )
        .await;
    let id = created.unwrap()["id"].clone();

    let (_, other) = app.login(&["post-author"]);
    let (status, _) = app.delete("/api/posts", Some(&other), json!({"items": [id]})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, deleted) = app.delete("/api/posts", Some(&author), json!({"items": [id]})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(deleted.unwrap()[0]["deleted_at"].is_string());

    let (_, list) = app.get("/api/posts", None).await;
    assert_eq!(list.unwrap()["pagination"]["total"], json!(0));
}

#[tokio::test]
async fn test_post_type_markdown_drops_type_field() {
    let app = TestApp::spawn_with(&[("content.post_type", "markdown")]).await;
    let (_, author) = app.login(&["post-author"]);
    let (status, created) = app
        .post(
            "/api/posts",
            Some(&author),
            json!({"title": "t", "body": "<b>x</b>", "type": "html"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let created = created.unwrap();
    assert_eq!(created["type"], json!("markdown"));
    assert_eq!(created["body"], json!("<b>x</b>"));
}

#[tokio::test]
async fn test_comment_on_published_post() {
    let app = TestApp::spawn().await;
    let (_, author) = app.login(&["post-author"]);
    let (_, post) = app
        .post(
            "/api/posts",
            Some(&author),
            json!({"title": "Open", "body": "b", "publish": true}),
        )
        .await;
    let post_id = post.unwrap()["id"].clone();

    let (_, reader) = app.login(&["user"]);
    let (status, _) = app
        .post("/api/comments", Some(&reader), json!({"body": "Nice", "post": post_id}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post("/api/comments", Some(&reader), json!({"body": "", "post": post_id}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, list) = app
        .get(&format!("/api/comments?post={}", post_id.as_str().unwrap()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.unwrap()["pagination"]["total"], json!(1));
}
