//! Binds resolved route tables to an axum router.

use axum::{
    body::Bytes,
    extract::{FromRequestParts, Path, Query, Request, State},
    http::request::Parts,
    response::{IntoResponse, Response},
    routing::{on, MethodRouter},
    Json, Router,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::controller::RouteInput;
use super::dto::query_object;
use super::resolver::{ResolvedRoute, RouteTable};
use crate::error::{AppError, Result};
use crate::middleware::auth::{AuthUser, OptionalAuth};
use crate::rbac::{authorize, RequestContext, RouteGuard};
use crate::state::HasCapabilities;

/// Request bodies above this size are rejected.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Build a router serving every route of `tables` under `prefix`.
///
/// Methods that are not enabled on a bound path answer 404.
pub fn build_routes<S: HasCapabilities>(prefix: &str, tables: &[RouteTable]) -> Router<S> {
    let mut grouped: Vec<(String, MethodRouter<S>)> = Vec::new();

    for route in tables.iter().flat_map(|t| t.routes.iter()) {
        let path = format!("{}{}", prefix, route.path);
        let route = Arc::new(route.clone());
        let filter = route.action.method_filter();
        let handler = move |State(state): State<S>, OptionalAuth(requester): OptionalAuth, request: Request| {
            let route = route.clone();
            async move {
                match dispatch(&route, &state, requester, request).await {
                    Ok(response) => response,
                    Err(e) => e.into_response(),
                }
            }
        };

        match grouped.iter_mut().find(|(p, _)| *p == path) {
            Some((_, methods)) => {
                let current = std::mem::take(methods);
                *methods = current.on(filter, handler);
            }
            None => grouped.push((path, on(filter, handler))),
        }
    }

    grouped
        .into_iter()
        .fold(Router::new(), |router, (path, methods)| {
            router.route(&path, methods.fallback(not_found))
        })
}

pub async fn not_found() -> Response {
    AppError::NotFound("No route for this request".to_string()).into_response()
}

async fn dispatch<S: HasCapabilities>(
    route: &ResolvedRoute,
    state: &S,
    requester: Option<AuthUser>,
    request: Request,
) -> Result<Response> {
    let (mut parts, body) = request.into_parts();

    let item = if route.action.has_item() {
        Some(path_item(&mut parts, state).await?)
    } else {
        None
    };

    let raw = if route.action.is_read() {
        let Query(pairs) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        query_object(pairs)
    } else {
        let bytes = axum::body::to_bytes(body, BODY_LIMIT)
            .await
            .map_err(|e| AppError::BadRequest(format!("Unreadable request body: {}", e)))?;
        parse_body(&bytes)?
    };

    let mut ctx = RequestContext::new(requester.clone()).with_body(raw.clone());
    if let Some(id) = item {
        ctx = ctx.with_path_item(id);
    }

    authorize(
        RouteGuard {
            resource: &route.resource,
            action: route.action.name(),
            checkers: &route.checkers,
            guest: route.guest,
        },
        state.role_table(),
        state.owner_lookup(),
        &ctx,
    )
    .await?;

    let input = route.input.parse(raw)?;
    let value = route
        .controller
        .handle(
            route.action,
            RouteInput {
                requester,
                item,
                input,
            },
        )
        .await?;

    Ok((route.action.success_status(), Json(value)).into_response())
}

/// A path item that is not a UUID cannot name a record.
async fn path_item<S: HasCapabilities>(parts: &mut Parts, state: &S) -> Result<Uuid> {
    let Path(raw) = Path::<String>::from_request_parts(parts, state)
        .await
        .map_err(|_| AppError::NotFound("Missing item id".to_string()))?;
    Uuid::parse_str(&raw).map_err(|_| AppError::NotFound(format!("No record `{}`", raw)))
}

fn parse_body(bytes: &Bytes) -> Result<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|e| AppError::BadRequest(format!("Malformed JSON body: {}", e)))
}
