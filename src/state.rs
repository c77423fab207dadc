//! Application state traits for dependency injection
//!
//! Handlers and extractors are generic over these traits so the same code
//! runs against the production `AppState` and test states.

use std::sync::Arc;

use crate::config::Configure;
use crate::jwt::JwtManager;
use crate::rbac::{OwnerLookup, RoleTable};

/// Access to the token verifier.
pub trait HasJwt {
    fn jwt_manager(&self) -> &JwtManager;
}

/// Everything route authorization needs.
pub trait HasCapabilities: HasJwt + Clone + Send + Sync + 'static {
    /// The static role table built at boot
    fn role_table(&self) -> &RoleTable;

    /// Owner lookup used by ownership checkers
    fn owner_lookup(&self) -> &dyn OwnerLookup;
}

/// Production application state
#[derive(Clone)]
pub struct AppState {
    pub configure: Arc<Configure>,
    pub jwt_manager: JwtManager,
    pub role_table: Arc<RoleTable>,
    pub owner_lookup: Arc<dyn OwnerLookup>,
}

impl HasJwt for AppState {
    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }
}

impl HasCapabilities for AppState {
    fn role_table(&self) -> &RoleTable {
        &self.role_table
    }

    fn owner_lookup(&self) -> &dyn OwnerLookup {
        self.owner_lookup.as_ref()
    }
}
