//! Manifest resolution: one route table per resource.

use axum::http::Method;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use super::action::CrudAction;
use super::controller::CrudController;
use super::dto::{DeleteDto, DetailQuery, ListQuery, RestoreDto};
use super::manifest::{ManifestFactory, RouteManifest};
use super::shape::{shape, AnyObject, InputShape};
use crate::config::Configure;
use crate::error::ManifestResolutionError;
use crate::rbac::Checker;

/// One concrete endpoint.
#[derive(Clone)]
pub struct ResolvedRoute {
    pub resource: String,
    pub action: CrudAction,
    pub method: Method,
    /// Path below the API prefix, e.g. `/posts/{item}`
    pub path: String,
    pub description: Option<String>,
    pub input: Arc<dyn InputShape>,
    pub checkers: Vec<Checker>,
    pub guest: bool,
    pub controller: Arc<dyn CrudController>,
}

impl std::fmt::Debug for ResolvedRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedRoute")
            .field("resource", &self.resource)
            .field("action", &self.action)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("input", &self.input.name())
            .field("checkers", &self.checkers)
            .field("guest", &self.guest)
            .finish()
    }
}

/// Plain description of a route, for listings and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRow {
    pub method: String,
    pub path: String,
    pub resource: String,
    pub action: CrudAction,
    pub input: String,
    pub guest: bool,
    pub checkers: usize,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    pub resource: String,
    pub routes: Vec<ResolvedRoute>,
}

impl RouteTable {
    pub fn describe(&self, prefix: &str) -> Vec<RouteRow> {
        self.routes
            .iter()
            .map(|r| RouteRow {
                method: r.method.to_string(),
                path: format!("{}{}", prefix, r.path),
                resource: r.resource.clone(),
                action: r.action,
                input: r.input.name().to_string(),
                guest: r.guest,
                checkers: r.checkers.len(),
            })
            .collect()
    }

    pub fn route(&self, action: CrudAction) -> Option<&ResolvedRoute> {
        self.routes.iter().find(|r| r.action == action)
    }
}

/// Build `controller`'s route table from the manifest `factory` produces.
pub async fn resolve(
    controller: Arc<dyn CrudController>,
    factory: &ManifestFactory,
    configure: Arc<Configure>,
) -> Result<RouteTable, ManifestResolutionError> {
    let resource = controller.resource().to_string();
    let manifest = factory(configure)
        .await
        .map_err(|source| ManifestResolutionError::FactoryFailed {
            resource: resource.clone(),
            source,
        })?;

    resolve_manifest(controller, manifest)
}

/// Resolution of an already built manifest.
pub fn resolve_manifest(
    controller: Arc<dyn CrudController>,
    manifest: RouteManifest,
) -> Result<RouteTable, ManifestResolutionError> {
    let resource = controller.resource().to_string();
    if manifest.resource != resource {
        return Err(ManifestResolutionError::ResourceMismatch {
            resource,
            found: manifest.resource,
        });
    }

    let base = controller.path().trim_end_matches('/').to_string();
    let mut seen = HashSet::new();
    let mut routes = Vec::with_capacity(manifest.entries.len());

    for entry in &manifest.entries {
        let action = CrudAction::parse(&entry.name).ok_or_else(|| {
            ManifestResolutionError::UnknownAction {
                resource: resource.clone(),
                action: entry.name.clone(),
            }
        })?;
        if !controller.templates().contains(&action) {
            return Err(ManifestResolutionError::MissingHandler {
                resource: resource.clone(),
                action: entry.name.clone(),
            });
        }
        if !seen.insert(action) {
            return Err(ManifestResolutionError::DuplicateAction {
                resource: resource.clone(),
                action: entry.name.clone(),
            });
        }

        routes.push(ResolvedRoute {
            resource: resource.clone(),
            action,
            method: action.method(),
            path: format!("{}{}", base, action.suffix()),
            description: entry.option.description.clone(),
            input: input_shape(action, &manifest),
            checkers: entry.option.checkers.clone(),
            guest: entry.option.allow_guest,
            controller: controller.clone(),
        });
    }

    tracing::debug!(resource = %resource, routes = routes.len(), "Route manifest resolved");
    Ok(RouteTable { resource, routes })
}

fn input_shape(action: CrudAction, manifest: &RouteManifest) -> Arc<dyn InputShape> {
    let dtos = &manifest.dtos;
    match action {
        CrudAction::List => dtos.list.clone().unwrap_or_else(shape::<ListQuery>),
        CrudAction::Detail => shape::<DetailQuery>(),
        CrudAction::Store => dtos.store.clone().unwrap_or_else(|| Arc::new(AnyObject)),
        CrudAction::Update => dtos
            .update
            .clone()
            .or_else(|| dtos.store.clone())
            .unwrap_or_else(|| Arc::new(AnyObject)),
        CrudAction::Delete => shape::<DeleteDto>(),
        CrudAction::Restore => shape::<RestoreDto>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MemoryRecordStore, RecordService};
    use crate::restful::controller::{BaseController, RouteInput};
    use crate::restful::manifest::{manifest_factory, ActionOption};
    use crate::rbac::PermissionAction;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use validator::Validate;

    #[derive(Debug, Serialize, Deserialize, Validate)]
    struct CreateCategory {
        #[validate(length(min = 1))]
        name: String,
    }

    fn configure() -> Arc<Configure> {
        Arc::new(Configure::with_overrides([("jwt.secret", "test-secret")]).unwrap())
    }

    fn controller() -> Arc<dyn CrudController> {
        let service = RecordService::new("category", Arc::new(MemoryRecordStore::new()));
        Arc::new(BaseController::new("category", "/categories", Arc::new(service)))
    }

    struct ReadOnly;

    #[async_trait]
    impl CrudController for ReadOnly {
        fn resource(&self) -> &str {
            "category"
        }
        fn path(&self) -> &str {
            "/categories/"
        }
        fn templates(&self) -> &[CrudAction] {
            &[CrudAction::List, CrudAction::Detail]
        }
        async fn handle(&self, _: CrudAction, _: RouteInput) -> crate::error::Result<Value> {
            Ok(Value::Null)
        }
    }

    fn manifest(names: &[&str]) -> RouteManifest {
        names.iter().fold(
            RouteManifest::new("category").store_shape(shape::<CreateCategory>()),
            |m, name| {
                m.action(
                    *name,
                    ActionOption::new().checker(Checker::can(PermissionAction::Manage, "category")),
                )
            },
        )
    }

    #[test]
    fn test_entries_resolve_in_manifest_order() {
        let table = resolve_manifest(controller(), manifest(&["store", "list", "detail"])).unwrap();
        let rows = table.describe("/api");

        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.method.as_str(), r.path.as_str(), r.input.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("POST", "/api/categories", "CreateCategory"),
                ("GET", "/api/categories", "ListQuery"),
                ("GET", "/api/categories/{item}", "DetailQuery"),
            ]
        );
        assert!(rows.iter().all(|r| r.checkers == 1 && !r.guest));
    }

    #[test]
    fn test_update_falls_back_to_store_shape() {
        let table = resolve_manifest(controller(), manifest(&["update"])).unwrap();
        assert_eq!(table.routes[0].input.name(), "CreateCategory");
    }

    #[test]
    fn test_unknown_action() {
        let err = resolve_manifest(controller(), manifest(&["list", "publish"])).unwrap_err();
        assert!(matches!(
            err,
            ManifestResolutionError::UnknownAction { ref action, .. } if action == "publish"
        ));
    }

    #[test]
    fn test_missing_handler() {
        let err = resolve_manifest(Arc::new(ReadOnly), manifest(&["list", "delete"])).unwrap_err();
        assert!(matches!(
            err,
            ManifestResolutionError::MissingHandler { ref action, .. } if action == "delete"
        ));
    }

    #[test]
    fn test_duplicate_action() {
        let err = resolve_manifest(controller(), manifest(&["list", "list"])).unwrap_err();
        assert!(matches!(err, ManifestResolutionError::DuplicateAction { .. }));
    }

    #[test]
    fn test_resource_mismatch() {
        let err = resolve_manifest(controller(), RouteManifest::new("post")).unwrap_err();
        assert!(matches!(err, ManifestResolutionError::ResourceMismatch { .. }));
    }

    #[test]
    fn test_trailing_slash_in_controller_path() {
        let table = resolve_manifest(Arc::new(ReadOnly), manifest(&["list", "detail"])).unwrap();
        assert_eq!(table.routes[0].path, "/categories");
        assert_eq!(table.routes[1].path, "/categories/{item}");
    }

    #[tokio::test]
    async fn test_resolving_twice_is_identical() {
        let factory = manifest_factory(|_| async { Ok(manifest(&["list", "detail", "delete"])) });
        let controller = controller();

        let first = resolve(controller.clone(), &factory, configure()).await.unwrap();
        let second = resolve(controller, &factory, configure()).await.unwrap();
        assert_eq!(first.describe("/api"), second.describe("/api"));
    }

    #[tokio::test]
    async fn test_factory_failure() {
        let factory = manifest_factory(|_| async { Err(anyhow::anyhow!("no config")) });
        let err = resolve(controller(), &factory, configure()).await.unwrap_err();
        assert!(matches!(err, ManifestResolutionError::FactoryFailed { .. }));
    }
}
