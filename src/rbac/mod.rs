//! Capability engine: role table, ability sets and checker chains.

pub mod ability;
pub mod checker;
pub mod context;
pub mod engine;
pub mod guard;
pub mod lookup;
pub mod roles;

pub use ability::{Ability, PermissionAction, ALL_SUBJECTS};
pub use checker::Checker;
pub use context::RequestContext;
pub use engine::evaluate;
pub use guard::{authorize, RouteGuard};
pub use lookup::OwnerLookup;
pub use roles::{
    PermissionDef, RbacContribution, RoleDef, RoleTable, SUPER_ADMIN_ROLE, USER_ROLE,
};
