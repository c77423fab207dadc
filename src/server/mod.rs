//! Application shell: provider container, capability state and HTTP router
//! built from one bootstrap descriptor.

use anyhow::Context;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::cli::OnListen;
use crate::config::Configure;
use crate::domain::{StoreOwnerLookup, SubjectStore};
use crate::error::Result;
use crate::jwt::JwtManager;
use crate::middleware::{HttpMetricsLayer, SanitizedMakeSpan};
use crate::module::{BootstrapDescriptor, Container, FeatureId};
use crate::rbac::{RbacContribution, RoleTable};
use crate::restful::routes::not_found;
use crate::restful::{Restful, RestfulResource, RESTFUL_FEATURE};
use crate::state::AppState;

pub struct App {
    configure: Arc<Configure>,
    bootstrap: Arc<BootstrapDescriptor>,
    container: Container,
    restful: Option<Restful>,
    state: AppState,
}

impl App {
    /// Build the container, the role table and the owner lookup, and resolve
    /// every route manifest when the restful feature is composed.
    pub async fn build(
        configure: Arc<Configure>,
        bootstrap: Arc<BootstrapDescriptor>,
    ) -> Result<Self> {
        let container = Container::build(&bootstrap);

        let contributions = container.get_all::<RbacContribution>();
        let role_table = RoleTable::build(contributions.iter().map(Arc::as_ref))?;

        let subjects = container.get_all::<SubjectStore>();
        let owner_lookup = StoreOwnerLookup::new(subjects.iter().map(Arc::as_ref));

        let restful = if bootstrap
            .feature(&FeatureId::from_static(RESTFUL_FEATURE))
            .is_some()
        {
            let resources = container.get_all::<RestfulResource>();
            Some(Restful::create(configure.clone(), resources.iter().map(Arc::as_ref)).await?)
        } else {
            None
        };

        let state = AppState {
            configure: configure.clone(),
            jwt_manager: JwtManager::new(configure.config().jwt.clone()),
            role_table: Arc::new(role_table),
            owner_lookup: Arc::new(owner_lookup),
        };

        info!(
            features = bootstrap.features.len(),
            subjects = subjects.len(),
            roles = state.role_table.roles().count(),
            routes = restful.as_ref().map(|r| r.describe().len()).unwrap_or(0),
            "Application built"
        );

        Ok(Self {
            configure,
            bootstrap,
            container,
            restful,
            state,
        })
    }

    pub fn configure(&self) -> &Arc<Configure> {
        &self.configure
    }

    pub fn bootstrap(&self) -> &BootstrapDescriptor {
        &self.bootstrap
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Resolved route tables; `None` when the restful feature is not composed.
    pub fn restful(&self) -> Option<&Restful> {
        self.restful.as_ref()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn role_table(&self) -> &RoleTable {
        &self.state.role_table
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let mut router: Router<AppState> = Router::new()
            .route("/health", get(health))
            .route("/ready", get(ready));

        if let Some(restful) = &self.restful {
            router = router.merge(restful.router::<AppState>());
        }

        if let Some(handle) = self.container.get::<PrometheusHandle>() {
            router = router.route(
                "/metrics",
                get(move || {
                    let handle = handle.clone();
                    async move { handle.render() }
                }),
            );
        }

        router
            .fallback(not_found)
            .layer(HttpMetricsLayer)
            .layer(TraceLayer::new_for_http().make_span_with(SanitizedMakeSpan))
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Bind `app.host:app.port`, call `on_listen` once and serve until ctrl-c.
    pub async fn listen(&self, on_listen: Option<OnListen>) -> anyhow::Result<()> {
        let http_addr = self.configure.config().http_addr();
        let listener = TcpListener::bind(&http_addr)
            .await
            .with_context(|| format!("Failed to bind {}", http_addr))?;
        let local = listener.local_addr()?;
        info!("HTTP server started on {}", local);

        if let Some(restful) = &self.restful {
            for row in restful.describe() {
                info!(
                    method = %row.method,
                    path = %row.path,
                    guest = row.guest,
                    checkers = row.checkers,
                    "Route"
                );
            }
        }
        if let Some(on_listen) = on_listen {
            on_listen(self, local);
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("HTTP server stopped");
        Ok(())
    }

    /// Release the application. Only the first call has an effect.
    pub fn close(&self) -> bool {
        let first = self.container.close();
        if first {
            info!("Application closed");
        }
        first
    }

    pub fn is_closed(&self) -> bool {
        self.container.is_closed()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn ready() -> impl IntoResponse {
    (StatusCode::OK, "ready")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{compose, FeatureDescriptor, FeatureRegistry, Provider, Registration};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn configure() -> Arc<Configure> {
        Arc::new(Configure::with_overrides([("jwt.secret", "server-secret")]).unwrap())
    }

    async fn app(registry: &FeatureRegistry, features: &[Registration]) -> App {
        let configure = configure();
        let boot = compose(registry, configure.clone(), features, None).await.unwrap();
        App::build(configure, Arc::new(boot)).await.unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(&FeatureRegistry::new(), &[]).await;
        let response = app
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let app = app(&FeatureRegistry::new(), &[]).await;
        let response = app
            .router()
            .oneshot(Request::builder().uri("/api/posts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(app.restful().is_none());
    }

    #[tokio::test]
    async fn test_role_table_from_contributions() {
        let mut registry = FeatureRegistry::new();
        registry.register_sync("rbac", |_, _| {
            Ok(FeatureDescriptor::new()
                .global()
                .provide_exported(Provider::value("rbac.system", RbacContribution::system())))
        });
        let app = app(&registry, &[Registration::from("rbac")]).await;

        assert!(app.role_table().role("super-admin").is_some());
        assert!(app.close());
        assert!(!app.close());
        assert!(app.is_closed());
    }
}
