//! Provider lookup over a composed bootstrap descriptor.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::composer::BootstrapDescriptor;
use super::descriptor::{FeatureId, Provider};
use super::merge::merge_all;
use crate::error::{AppError, Result};

/// Ordered providers with typed lookup.
#[derive(Debug, Clone, Default)]
pub struct ProviderSet {
    providers: Vec<Provider>,
}

impl ProviderSet {
    fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// Last registered provider of type `T`.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.providers
            .iter()
            .rev()
            .find_map(Provider::downcast::<T>)
    }

    /// Every provider of type `T`, in registration order.
    pub fn get_all<T: Any + Send + Sync>(&self) -> Vec<Arc<T>> {
        self.providers
            .iter()
            .filter_map(Provider::downcast::<T>)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Strict view for one feature: its own providers, the exports of the
/// features it imports and the exports of global features.
pub type ModuleScope = ProviderSet;

pub struct Container {
    root: ProviderSet,
    scopes: HashMap<FeatureId, ModuleScope>,
    closed: AtomicBool,
}

impl Container {
    pub fn build(bootstrap: &BootstrapDescriptor) -> Self {
        let global_exports: Vec<Provider> = bootstrap
            .features
            .iter()
            .filter(|f| bootstrap.is_global(&f.id))
            .flat_map(|f| f.descriptor.exports.iter().cloned())
            .collect();

        let scopes = bootstrap
            .features
            .iter()
            .map(|feature| {
                let own = feature.descriptor.clone();
                let imported = feature.descriptor.imports.iter().filter_map(|id| {
                    bootstrap.feature(id).map(|d| {
                        let mut exported = super::FeatureDescriptor::new();
                        exported.providers = d.exports.clone();
                        exported
                    })
                });
                let mut globals = super::FeatureDescriptor::new();
                globals.providers = global_exports.clone();

                let visible: Vec<_> = std::iter::once(own)
                    .chain(imported)
                    .chain(std::iter::once(globals))
                    .collect();
                let scope = merge_all(visible.iter());
                (feature.id.clone(), ProviderSet::new(scope.providers))
            })
            .collect();

        Self {
            root: ProviderSet::new(bootstrap.descriptor.providers.clone()),
            scopes,
            closed: AtomicBool::new(false),
        }
    }

    /// Non-strict lookup across every provider; the last registered wins.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.root.get::<T>()
    }

    pub fn get_all<T: Any + Send + Sync>(&self) -> Vec<Arc<T>> {
        self.root.get_all::<T>()
    }

    /// Like [`Container::get`] but missing providers are an error.
    pub fn require<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.get::<T>().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "no provider registered for {}",
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn module(&self, id: &FeatureId) -> Option<&ModuleScope> {
        self.scopes.get(id)
    }

    /// Mark the container closed. Returns `false` when it already was.
    pub fn close(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::SeqCst);
        if first {
            tracing::debug!(providers = self.root.len(), "Container closed");
        }
        first
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
