//! HTTP test infrastructure
//!
//! Applications are composed from real feature builders and driven through
//! the production router with `tower::ServiceExt::oneshot`. No listener is
//! bound.

pub mod boot_test;
pub mod catalogue_test;
pub mod post_test;
pub mod user_test;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use folio_core::config::Configure;
use folio_core::domains;
use folio_core::jwt::JwtManager;
use folio_core::module::{compose, FeatureDescriptor, FeatureRegistry, Registration};
use folio_core::server::App;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-for-api-testing-purposes";

pub fn test_configure(overrides: &[(&str, &str)]) -> Arc<Configure> {
    let mut all = vec![("jwt.secret", TEST_SECRET)];
    all.extend_from_slice(overrides);
    Arc::new(Configure::with_overrides(all).unwrap())
}

/// A built application plus its router.
pub struct TestApp {
    pub app: App,
    pub router: Router,
    jwt: JwtManager,
}

impl TestApp {
    /// Boot the default feature set.
    pub async fn spawn() -> Self {
        Self::spawn_with(&[]).await
    }

    pub async fn spawn_with(overrides: &[(&str, &str)]) -> Self {
        let configure = test_configure(overrides);
        let registrations = domains::default_registrations(&configure);
        Self::boot(&domains::registry(), configure, &registrations, None).await
    }

    pub async fn boot(
        registry: &FeatureRegistry,
        configure: Arc<Configure>,
        registrations: &[Registration],
        overrides: Option<FeatureDescriptor>,
    ) -> Self {
        let bootstrap = compose(registry, configure.clone(), registrations, overrides)
            .await
            .unwrap();
        let app = App::build(configure.clone(), Arc::new(bootstrap))
            .await
            .unwrap();
        let router = app.router();
        Self {
            app,
            router,
            jwt: JwtManager::new(configure.config().jwt.clone()),
        }
    }

    /// A fresh requester holding `roles`, with a bearer token.
    pub fn login(&self, roles: &[&str]) -> (Uuid, String) {
        let id = Uuid::new_v4();
        (id, self.token_for(id, roles))
    }

    pub fn token_for(&self, id: Uuid, roles: &[&str]) -> String {
        self.jwt
            .create_access_token(id, roles.iter().map(|r| r.to_string()).collect())
            .unwrap()
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Option<Value>) {
        send(&self.router, Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Option<Value>) {
        send(&self.router, Method::POST, path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Option<Value>) {
        send(&self.router, Method::PATCH, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Option<Value>) {
        send(&self.router, Method::DELETE, path, token, Some(body)).await
    }
}

/// Make a request and parse the JSON response, if any
pub async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    let mut request = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();

    if body_bytes.is_empty() {
        return (status, None);
    }

    match serde_json::from_slice(&body_bytes) {
        Ok(data) => (status, Some(data)),
        Err(_) => (status, None),
    }
}
