//! Route Manifest Resolver
//!
//! Each feature contributes [`RestfulResource`]s: a controller plus a factory
//! producing its [`RouteManifest`]. At boot every manifest is resolved into a
//! [`RouteTable`] of concrete endpoints with their input shapes and checker
//! chains, and the tables are bound to one axum router.

pub mod action;
pub mod controller;
pub mod docs;
pub mod dto;
pub mod factory;
pub mod manifest;
pub mod resolver;
pub mod routes;
pub mod shape;

pub use action::CrudAction;
pub use controller::{BaseController, CrudController, RouteInput};
pub use factory::{Restful, RestfulResource, RESTFUL_FEATURE};
pub use manifest::{
    manifest_factory, simple_crud_options, ActionOption, DtoVariants, ManifestEntry,
    ManifestFactory, RouteManifest,
};
pub use resolver::{resolve, resolve_manifest, ResolvedRoute, RouteRow, RouteTable};
pub use shape::{shape, AnyObject, InputShape};
