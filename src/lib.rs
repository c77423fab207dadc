//! Folio Core - manifest-driven content backend
//!
//! Features are composed into one bootstrap descriptor, their route manifests
//! are resolved into a REST surface guarded by role permissions and ownership
//! checks, and their commands are assembled into a single CLI entry point.

pub mod cli;
pub mod config;
pub mod domain;
pub mod domains;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod module;
pub mod rbac;
pub mod restful;
pub mod server;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::{Config, Configure};
pub use error::{AppError, Result};
