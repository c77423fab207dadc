//! Explicit table of feature builders, filled once at program start.

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use super::descriptor::{FeatureDescriptor, FeatureId};
use crate::config::Configure;

pub type FeatureFuture = BoxFuture<'static, anyhow::Result<FeatureDescriptor>>;

/// Builds a feature's descriptor from the configuration and its parameter bag.
pub type FeatureBuilder = Arc<dyn Fn(Arc<Configure>, Value) -> FeatureFuture + Send + Sync>;

#[derive(Clone, Default)]
pub struct FeatureRegistry {
    builders: HashMap<FeatureId, FeatureBuilder>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async builder. A later registration for the same id replaces
    /// the earlier one.
    pub fn register<F, Fut>(&mut self, id: impl Into<FeatureId>, builder: F) -> &mut Self
    where
        F: Fn(Arc<Configure>, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<FeatureDescriptor>> + Send + 'static,
    {
        let id = id.into();
        let wrapped: FeatureBuilder = Arc::new(move |configure, params| {
            builder(configure, params).boxed()
        });
        if self.builders.insert(id.clone(), wrapped).is_some() {
            tracing::warn!(feature = %id, "Feature builder registered twice, keeping the latest");
        }
        self
    }

    /// Register a builder that needs no awaiting.
    pub fn register_sync<F>(&mut self, id: impl Into<FeatureId>, builder: F) -> &mut Self
    where
        F: Fn(&Configure, &Value) -> anyhow::Result<FeatureDescriptor> + Send + Sync + 'static,
    {
        self.register(id, move |configure: Arc<Configure>, params: Value| {
            futures::future::ready(builder(&configure, &params))
        })
    }

    pub fn get(&self, id: &FeatureId) -> Option<&FeatureBuilder> {
        self.builders.get(id)
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.builders.contains_key(id)
    }
}

/// A request to build one feature, optionally with parameters.
#[derive(Debug, Clone)]
pub struct Registration {
    pub feature: FeatureId,
    pub params: Value,
}

impl Registration {
    pub fn new(feature: impl Into<FeatureId>) -> Self {
        Self {
            feature: feature.into(),
            params: Value::Null,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

impl From<FeatureId> for Registration {
    fn from(feature: FeatureId) -> Self {
        Self::new(feature)
    }
}

impl From<&'static str> for Registration {
    fn from(feature: &'static str) -> Self {
        Self::new(feature)
    }
}
