//! Per-request inputs to capability checks.

use serde_json::Value;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;

/// What a checker may inspect about the current request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// `None` for anonymous requests
    pub requester: Option<AuthUser>,
    /// Item id taken from the route path, if the route has one
    pub path_item: Option<Uuid>,
    /// Parsed request body (`Value::Null` when there is none)
    pub body: Value,
}

impl RequestContext {
    pub fn new(requester: Option<AuthUser>) -> Self {
        Self {
            requester,
            path_item: None,
            body: Value::Null,
        }
    }

    pub fn with_path_item(mut self, item: Uuid) -> Self {
        self.path_item = Some(item);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn requester_id(&self) -> Option<Uuid> {
        self.requester.as_ref().map(|u| u.user_id)
    }

    /// Record ids this request refers to: the path item, else the body's
    /// `items` list, else the body's `id`. `None` when a referenced id is
    /// not a valid UUID.
    pub fn target_ids(&self) -> Option<Vec<Uuid>> {
        if let Some(item) = self.path_item {
            return Some(vec![item]);
        }
        match self.body.get("items") {
            Some(Value::Array(items)) => items.iter().map(parse_id).collect(),
            Some(_) => None,
            None => match self.body.get("id") {
                Some(id) => parse_id(id).map(|id| vec![id]),
                None => Some(Vec::new()),
            },
        }
    }
}

fn parse_id(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s).ok())
}
