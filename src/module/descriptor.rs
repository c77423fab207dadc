//! Feature descriptors and the values they carry.

use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::cli::Command;

/// Identity of a feature unit in the [`FeatureRegistry`](super::FeatureRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(Cow<'static, str>);

impl FeatureId {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for FeatureId {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

/// An injectable value. Two providers are the same provider only when they
/// share the same allocation; cloning a `Provider` keeps its identity.
#[derive(Clone)]
pub struct Provider {
    token: Cow<'static, str>,
    type_id: TypeId,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl Provider {
    pub fn value<T: Any + Send + Sync>(token: impl Into<Cow<'static, str>>, value: T) -> Self {
        Self::shared(token, Arc::new(value))
    }

    pub fn shared<T: Any + Send + Sync>(
        token: impl Into<Cow<'static, str>>,
        value: Arc<T>,
    ) -> Self {
        Self {
            token: token.into(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        if self.type_id != TypeId::of::<T>() {
            return None;
        }
        self.value.clone().downcast::<T>().ok()
    }

    /// Identity comparison used for deduplication.
    pub fn same(&self, other: &Provider) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("token", &self.token)
            .field("type", &self.type_name)
            .finish()
    }
}

/// What a feature contributes to the bootstrap unit.
#[derive(Clone, Default)]
pub struct FeatureDescriptor {
    /// Other features this one depends on, in declaration order
    pub imports: Vec<FeatureId>,
    pub providers: Vec<Provider>,
    /// Providers visible to features importing this one
    pub exports: Vec<Provider>,
    pub commands: Vec<Arc<Command>>,
    /// Free-form options, deep-merged key by key
    pub options: Map<String, Value>,
    /// Visible to every feature without an explicit import
    pub global: bool,
}

impl FeatureDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import(mut self, feature: impl Into<FeatureId>) -> Self {
        self.imports.push(feature.into());
        self
    }

    pub fn provide(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn export(mut self, provider: Provider) -> Self {
        self.exports.push(provider);
        self
    }

    /// Provide and export the same provider.
    pub fn provide_exported(self, provider: Provider) -> Self {
        self.provide(provider.clone()).export(provider)
    }

    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(Arc::new(command));
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
            && self.providers.is_empty()
            && self.exports.is_empty()
            && self.commands.is_empty()
            && self.options.is_empty()
            && !self.global
    }
}

impl PartialEq for FeatureDescriptor {
    fn eq(&self, other: &Self) -> bool {
        fn same_by<T>(a: &[T], b: &[T], same: impl Fn(&T, &T) -> bool) -> bool {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same(x, y))
        }

        self.imports == other.imports
            && same_by(&self.providers, &other.providers, Provider::same)
            && same_by(&self.exports, &other.exports, Provider::same)
            && same_by(&self.commands, &other.commands, |a, b| Arc::ptr_eq(a, b))
            && self.options == other.options
            && self.global == other.global
    }
}

impl fmt::Debug for FeatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureDescriptor")
            .field("imports", &self.imports)
            .field("providers", &self.providers)
            .field("exports", &self.exports)
            .field(
                "commands",
                &self.commands.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("options", &self.options)
            .field("global", &self.global)
            .finish()
    }
}
