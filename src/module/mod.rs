//! Feature composition.
//!
//! Features register builders in a [`FeatureRegistry`]; [`compose`] runs them
//! and merges their [`FeatureDescriptor`]s into one [`BootstrapDescriptor`],
//! from which a [`Container`] resolves providers.

pub mod composer;
pub mod container;
pub mod descriptor;
pub mod merge;
pub mod registry;

pub use composer::{compose, BootstrapDescriptor, ResolvedFeature, BOOT_MODULE};
pub use container::{Container, ModuleScope, ProviderSet};
pub use descriptor::{FeatureDescriptor, FeatureId, Provider};
pub use merge::{merge, merge_all};
pub use registry::{FeatureBuilder, FeatureRegistry, Registration};
