//! The restful surface: every resource contributed by the composed features.

use axum::{routing::get, Json, Router};
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::openapi::OpenApi;

use super::controller::CrudController;
use super::docs::build_openapi;
use super::manifest::ManifestFactory;
use super::resolver::{resolve, RouteRow, RouteTable};
use super::routes::build_routes;
use crate::config::Configure;
use crate::error::ManifestResolutionError;
use crate::state::HasCapabilities;

/// Id of the feature that turns on the restful surface.
pub const RESTFUL_FEATURE: &str = "restful";

/// A controller and its manifest factory, provided by a feature.
#[derive(Clone)]
pub struct RestfulResource {
    pub controller: Arc<dyn CrudController>,
    pub manifest: ManifestFactory,
}

impl RestfulResource {
    pub fn new(controller: Arc<dyn CrudController>, manifest: ManifestFactory) -> Self {
        Self {
            controller,
            manifest,
        }
    }
}

/// Resolved route tables for every resource.
#[derive(Debug, Clone)]
pub struct Restful {
    prefix: String,
    docs: bool,
    tables: Vec<RouteTable>,
}

impl Restful {
    /// Resolve the manifest of each resource, in the order given.
    pub async fn create<'a, I>(
        configure: Arc<Configure>,
        resources: I,
    ) -> Result<Self, ManifestResolutionError>
    where
        I: IntoIterator<Item = &'a RestfulResource>,
    {
        let api = &configure.config().api;
        let prefix = api.prefix.trim_end_matches('/').to_string();
        let docs = api.docs;

        let mut tables = Vec::new();
        for resource in resources {
            let table = resolve(
                resource.controller.clone(),
                &resource.manifest,
                configure.clone(),
            )
            .await?;
            tables.push(table);
        }

        let restful = Self {
            prefix,
            docs,
            tables,
        };
        restful.check_conflicts()?;
        Ok(restful)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn tables(&self) -> &[RouteTable] {
        &self.tables
    }

    pub fn table(&self, resource: &str) -> Option<&RouteTable> {
        self.tables.iter().find(|t| t.resource == resource)
    }

    /// Every route as a plain row, in registration order.
    pub fn describe(&self) -> Vec<RouteRow> {
        self.tables
            .iter()
            .flat_map(|t| t.describe(&self.prefix))
            .collect()
    }

    pub fn openapi(&self) -> OpenApi {
        build_openapi(&self.prefix, &self.tables)
    }

    pub fn router<S: HasCapabilities>(&self) -> Router<S> {
        let router = build_routes(&self.prefix, &self.tables);
        if !self.docs {
            return router;
        }

        let doc = Arc::new(self.openapi());
        router.route(
            &format!("{}/docs/openapi.json", self.prefix),
            get(move || {
                let doc = doc.clone();
                async move { Json(doc.as_ref().clone()) }
            }),
        )
    }

    fn check_conflicts(&self) -> Result<(), ManifestResolutionError> {
        let mut bound = HashSet::new();
        for row in self.describe() {
            if !bound.insert((row.method.clone(), row.path.clone())) {
                return Err(ManifestResolutionError::RouteConflict {
                    method: row.method,
                    path: row.path,
                });
            }
        }
        Ok(())
    }
}
