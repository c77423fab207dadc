//! Composition of registered features into one bootstrap descriptor.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

use super::descriptor::{FeatureDescriptor, FeatureId};
use super::merge::merge;
use super::registry::{FeatureRegistry, Registration};
use crate::cli::Command;
use crate::config::Configure;
use crate::error::CompositionError;

/// Name of the generated top-level container.
pub const BOOT_MODULE: &str = "BootModule";

/// A feature and the descriptor its builder produced.
#[derive(Debug, Clone)]
pub struct ResolvedFeature {
    pub id: FeatureId,
    pub descriptor: FeatureDescriptor,
}

/// The merged unit the process is built from.
#[derive(Debug, Clone)]
pub struct BootstrapDescriptor {
    pub name: &'static str,
    /// All features merged, with the caller override applied last
    pub descriptor: FeatureDescriptor,
    /// Per-feature descriptors in resolution order
    pub features: Vec<ResolvedFeature>,
    /// Features that asked to be globally visible
    pub globals: Vec<FeatureId>,
}

impl BootstrapDescriptor {
    /// Child modules of the boot module.
    pub fn children(&self) -> &[FeatureId] {
        &self.descriptor.imports
    }

    pub fn feature(&self, id: &FeatureId) -> Option<&FeatureDescriptor> {
        self.features
            .iter()
            .find(|f| &f.id == id)
            .map(|f| &f.descriptor)
    }

    pub fn is_global(&self, id: &FeatureId) -> bool {
        self.globals.contains(id)
    }

    pub fn commands(&self) -> &[Arc<Command>] {
        &self.descriptor.commands
    }
}

/// Build every registered feature (and, transitively, the features they
/// import) and merge the results. Any builder failure aborts composition.
pub async fn compose(
    registry: &FeatureRegistry,
    configure: Arc<Configure>,
    registrations: &[Registration],
    overrides: Option<FeatureDescriptor>,
) -> Result<BootstrapDescriptor, CompositionError> {
    let mut queue: VecDeque<Registration> = registrations.iter().cloned().collect();
    let mut features: Vec<ResolvedFeature> = Vec::new();
    let mut globals = Vec::new();

    while let Some(registration) = queue.pop_front() {
        if features.iter().any(|f| f.id == registration.feature) {
            debug!(feature = %registration.feature, "Feature already resolved, skipping");
            continue;
        }

        let descriptor = build_feature(registry, &configure, &registration).await?;
        validate_exports(&registration.feature, &descriptor)?;

        if descriptor.global {
            globals.push(registration.feature.clone());
        }
        for import in &descriptor.imports {
            let pending = features.iter().any(|f| &f.id == import)
                || queue.iter().any(|r| &r.feature == import)
                || import == &registration.feature;
            if !pending {
                queue.push_back(Registration::new(import.clone()));
            }
        }

        features.push(ResolvedFeature {
            id: registration.feature,
            descriptor,
        });
    }

    let mut merged = FeatureDescriptor::new();
    for feature in &features {
        merged = merge(merged, &FeatureDescriptor::new().import(feature.id.clone()));
        merged = merge(merged, &feature.descriptor);
    }
    if let Some(overrides) = overrides {
        merged = merge(merged, &overrides);
    }

    check_command_names(&merged.commands)?;

    info!(
        features = features.len(),
        providers = merged.providers.len(),
        commands = merged.commands.len(),
        "Composed {}",
        BOOT_MODULE
    );

    Ok(BootstrapDescriptor {
        name: BOOT_MODULE,
        descriptor: merged,
        features,
        globals,
    })
}

async fn build_feature(
    registry: &FeatureRegistry,
    configure: &Arc<Configure>,
    registration: &Registration,
) -> Result<FeatureDescriptor, CompositionError> {
    let Some(builder) = registry.get(&registration.feature) else {
        debug!(
            feature = %registration.feature,
            "No builder registered, contributing an empty descriptor"
        );
        return Ok(FeatureDescriptor::new());
    };

    builder(configure.clone(), registration.params.clone())
        .await
        .map_err(|source| CompositionError::BuilderFailed {
            feature: registration.feature.to_string(),
            source,
        })
}

fn validate_exports(
    feature: &FeatureId,
    descriptor: &FeatureDescriptor,
) -> Result<(), CompositionError> {
    for export in &descriptor.exports {
        if !descriptor.providers.iter().any(|p| p.same(export)) {
            return Err(CompositionError::ExportNotProvided {
                feature: feature.to_string(),
                token: export.token().to_string(),
            });
        }
    }
    Ok(())
}

fn check_command_names(commands: &[Arc<Command>]) -> Result<(), CompositionError> {
    let mut seen: HashMap<&str, &Arc<Command>> = HashMap::new();
    for command in commands {
        if command.name() == crate::cli::START_COMMAND {
            return Err(CompositionError::ConflictingCommand {
                name: command.name().to_string(),
            });
        }
        if let Some(existing) = seen.insert(command.name(), command) {
            if !Arc::ptr_eq(existing, command) {
                return Err(CompositionError::ConflictingCommand {
                    name: command.name().to_string(),
                });
            }
        }
    }
    Ok(())
}
