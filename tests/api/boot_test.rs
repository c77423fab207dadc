//! Booting the default feature set

use super::{test_configure, TestApp};
use axum::http::StatusCode;
use folio_core::domains;
use folio_core::module::{FeatureDescriptor, FeatureId, Provider};
use metrics_exporter_prometheus::PrometheusBuilder;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_default_features_are_composed() {
    let app = TestApp::spawn().await;
    let bootstrap = app.app.bootstrap();

    let ids: Vec<&str> = bootstrap.features.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["rbac", "restful", "user", "content", "manga", "novel"]);
    assert!(bootstrap.is_global(&FeatureId::from_static("rbac")));

    let resources: Vec<&str> = app
        .app
        .restful()
        .unwrap()
        .tables()
        .iter()
        .map(|t| t.resource.as_str())
        .collect();
    assert_eq!(
        resources,
        vec![
            "user",
            "post",
            "category",
            "comment",
            "manga",
            "manga-chapter",
            "manga-image",
            "novel",
            "novel-volume",
            "novel-chapter",
        ]
    );

    for role in ["user", "super-admin", "post-author", "content-manager", "manga-editor", "novel-manager"] {
        assert!(app.app.role_table().role(role).is_some(), "missing role {}", role);
    }
}

#[tokio::test]
async fn test_health_and_docs() {
    let app = TestApp::spawn().await;

    let (status, health) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health.unwrap()["status"], json!("healthy"));

    let (status, doc) = app.get("/api/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    let doc = doc.unwrap();
    assert!(doc["paths"]["/api/posts"]["get"].is_object());
    assert!(doc["paths"]["/api/posts/{item}"]["patch"]["security"].is_array());
}

#[tokio::test]
async fn test_api_disabled_has_no_rest_surface() {
    let app = TestApp::spawn_with(&[("api.enabled", "false")]).await;
    assert!(app.app.restful().is_none());

    let (status, _) = app.get("/api/posts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_custom_prefix() {
    let app = TestApp::spawn_with(&[("api.prefix", "/v1/")]).await;
    let (status, _) = app.get("/v1/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/posts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_route_from_override_provider() {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let configure = test_configure(&[]);
    let registrations = domains::default_registrations(&configure);
    let app = TestApp::boot(
        &domains::registry(),
        configure,
        &registrations,
        Some(FeatureDescriptor::new().provide(Provider::value("metrics.prometheus", handle))),
    )
    .await;

    let response = metrics_status(&app).await;
    assert_eq!(response, StatusCode::OK);

    let without = TestApp::spawn().await;
    assert_eq!(metrics_status(&without).await, StatusCode::NOT_FOUND);
}

async fn metrics_status(app: &TestApp) -> StatusCode {
    app.get("/metrics", None).await.0
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let app = TestApp::spawn().await;
    assert!(app.app.close());
    assert!(!app.app.close());
    assert!(app.app.is_closed());
}
