//! Unified error handling for Folio Core

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Fatal errors raised while composing feature descriptors at boot.
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("feature `{feature}` failed to build: {source}")]
    BuilderFailed {
        feature: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("feature `{feature}` exports `{token}` which it does not provide")]
    ExportNotProvided { feature: String, token: String },

    #[error("command `{name}` is declared more than once")]
    ConflictingCommand { name: String },

    #[error("role `{role}` references unknown permission `{permission}`")]
    UnknownPermission { role: String, permission: String },
}

/// Fatal errors raised while turning a route manifest into a route table.
#[derive(Error, Debug)]
pub enum ManifestResolutionError {
    #[error("resource `{resource}`: action `{action}` is not a known route template")]
    UnknownAction { resource: String, action: String },

    #[error("resource `{resource}`: controller has no handler for action `{action}`")]
    MissingHandler { resource: String, action: String },

    #[error("resource `{resource}`: action `{action}` is enabled more than once")]
    DuplicateAction { resource: String, action: String },

    #[error("manifest id `{found}` does not match resource `{resource}`")]
    ResourceMismatch { resource: String, found: String },

    #[error("route `{method} {path}` is bound by more than one resource")]
    RouteConflict { method: String, path: String },

    #[error("resource `{resource}`: manifest factory failed: {source}")]
    FactoryFailed {
        resource: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Capability lookup failed: {0}")]
    CapabilityLookup(String),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Manifest(#[from] ManifestResolutionError),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl AppError {
    /// HTTP status this error is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::CapabilityLookup(_)
            | AppError::Composition(_)
            | AppError::Manifest(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message) = match &self {
            AppError::NotFound(msg) => ("not_found", msg.clone()),
            AppError::BadRequest(msg) => ("bad_request", msg.clone()),
            AppError::Unauthorized(msg) => ("unauthorized", msg.clone()),
            AppError::Forbidden(msg) => ("forbidden", msg.clone()),
            AppError::Conflict(msg) => ("conflict", msg.clone()),
            AppError::Validation(msg) => ("validation", msg.clone()),
            AppError::CapabilityLookup(msg) => {
                tracing::error!("Capability lookup error: {}", msg);
                (
                    "capability_lookup_error",
                    "Unable to verify resource ownership".to_string(),
                )
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                ("jwt_error", "Invalid or expired token".to_string())
            }
            AppError::Composition(e) => {
                tracing::error!("Composition error: {}", e);
                ("internal_error", "An internal error occurred".to_string())
            }
            AppError::Manifest(e) => {
                tracing::error!("Manifest error: {}", e);
                ("internal_error", "An internal error occurred".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                ("internal_error", "An internal error occurred".to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        });

        (status, body).into_response()
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
