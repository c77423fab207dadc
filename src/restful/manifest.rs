//! Declarative per-resource route manifests.

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;

use super::shape::InputShape;
use crate::config::Configure;
use crate::rbac::Checker;

/// Options of one enabled action.
#[derive(Clone, Default)]
pub struct ActionOption {
    pub description: Option<String>,
    /// Checker chain; passes when any checker passes
    pub checkers: Vec<Checker>,
    /// Skip authorization entirely
    pub allow_guest: bool,
}

impl ActionOption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn checker(mut self, checker: Checker) -> Self {
        self.checkers.push(checker);
        self
    }

    pub fn guest(mut self) -> Self {
        self.allow_guest = true;
        self
    }
}

impl std::fmt::Debug for ActionOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionOption")
            .field("description", &self.description)
            .field("checkers", &self.checkers)
            .field("allow_guest", &self.allow_guest)
            .finish()
    }
}

/// Same checkers and description for a list of actions.
pub fn simple_crud_options(
    actions: &[&str],
    checkers: &[Checker],
    description: &str,
) -> Vec<ManifestEntry> {
    actions
        .iter()
        .map(|name| ManifestEntry {
            name: name.to_string(),
            option: ActionOption {
                description: Some(format!("{}, {}", description, name)),
                checkers: checkers.to_vec(),
                allow_guest: false,
            },
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub name: String,
    pub option: ActionOption,
}

/// Input shape variants chosen by the manifest factory.
#[derive(Clone, Default)]
pub struct DtoVariants {
    pub list: Option<Arc<dyn InputShape>>,
    pub store: Option<Arc<dyn InputShape>>,
    pub update: Option<Arc<dyn InputShape>>,
}

#[derive(Clone)]
pub struct RouteManifest {
    /// Resource this manifest configures
    pub resource: String,
    /// Enabled actions in registration order
    pub entries: Vec<ManifestEntry>,
    pub dtos: DtoVariants,
}

impl RouteManifest {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            entries: Vec::new(),
            dtos: DtoVariants::default(),
        }
    }

    pub fn action(mut self, name: impl Into<String>, option: ActionOption) -> Self {
        self.entries.push(ManifestEntry {
            name: name.into(),
            option,
        });
        self
    }

    pub fn actions(mut self, entries: impl IntoIterator<Item = ManifestEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    pub fn list_shape(mut self, shape: Arc<dyn InputShape>) -> Self {
        self.dtos.list = Some(shape);
        self
    }

    pub fn store_shape(mut self, shape: Arc<dyn InputShape>) -> Self {
        self.dtos.store = Some(shape);
        self
    }

    pub fn update_shape(mut self, shape: Arc<dyn InputShape>) -> Self {
        self.dtos.update = Some(shape);
        self
    }
}

pub type ManifestFuture = BoxFuture<'static, anyhow::Result<RouteManifest>>;

/// Builds a resource's manifest from configuration, once per process.
pub type ManifestFactory = Arc<dyn Fn(Arc<Configure>) -> ManifestFuture + Send + Sync>;

pub fn manifest_factory<F, Fut>(f: F) -> ManifestFactory
where
    F: Fn(Arc<Configure>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<RouteManifest>> + Send + 'static,
{
    Arc::new(move |configure| f(configure).boxed())
}
