//! HTTP middleware for Folio Core
//!
//! - JWT extractor (`OptionalAuth`)
//! - Request metrics and request id propagation
//! - Request span maker for the trace layer

pub mod auth;
pub mod metrics;
pub mod trace;

pub use auth::{AuthUser, OptionalAuth};
pub use metrics::HttpMetricsLayer;
pub use trace::SanitizedMakeSpan;
