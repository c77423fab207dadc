//! The fixed CRUD route templates.

use axum::http::{Method, StatusCode};
use axum::routing::MethodFilter;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudAction {
    List,
    Detail,
    Store,
    Update,
    Delete,
    Restore,
}

impl CrudAction {
    pub const ALL: [CrudAction; 6] = [
        CrudAction::List,
        CrudAction::Detail,
        CrudAction::Store,
        CrudAction::Update,
        CrudAction::Delete,
        CrudAction::Restore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CrudAction::List => "list",
            CrudAction::Detail => "detail",
            CrudAction::Store => "store",
            CrudAction::Update => "update",
            CrudAction::Delete => "delete",
            CrudAction::Restore => "restore",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    pub fn method(&self) -> Method {
        match self {
            CrudAction::List | CrudAction::Detail => Method::GET,
            CrudAction::Store => Method::POST,
            CrudAction::Update | CrudAction::Restore => Method::PATCH,
            CrudAction::Delete => Method::DELETE,
        }
    }

    pub(crate) fn method_filter(&self) -> MethodFilter {
        match self {
            CrudAction::List | CrudAction::Detail => MethodFilter::GET,
            CrudAction::Store => MethodFilter::POST,
            CrudAction::Update | CrudAction::Restore => MethodFilter::PATCH,
            CrudAction::Delete => MethodFilter::DELETE,
        }
    }

    /// Path relative to the resource root.
    pub fn suffix(&self) -> &'static str {
        match self {
            CrudAction::Detail | CrudAction::Update => "/{item}",
            CrudAction::Restore => "/restore",
            CrudAction::List | CrudAction::Store | CrudAction::Delete => "",
        }
    }

    /// Whether the route carries an item id in its path.
    pub fn has_item(&self) -> bool {
        matches!(self, CrudAction::Detail | CrudAction::Update)
    }

    /// Read actions take their input from the query string.
    pub fn is_read(&self) -> bool {
        matches!(self, CrudAction::List | CrudAction::Detail)
    }

    pub fn success_status(&self) -> StatusCode {
        match self {
            CrudAction::Store => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }
}

impl fmt::Display for CrudAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("list", Some(CrudAction::List))]
    #[case("restore", Some(CrudAction::Restore))]
    #[case("publish", None)]
    #[case("List", None)]
    fn test_parse(#[case] name: &str, #[case] expected: Option<CrudAction>) {
        assert_eq!(CrudAction::parse(name), expected);
    }

    #[rstest]
    #[case(CrudAction::List, Method::GET, "")]
    #[case(CrudAction::Detail, Method::GET, "/{item}")]
    #[case(CrudAction::Store, Method::POST, "")]
    #[case(CrudAction::Update, Method::PATCH, "/{item}")]
    #[case(CrudAction::Delete, Method::DELETE, "")]
    #[case(CrudAction::Restore, Method::PATCH, "/restore")]
    fn test_templates(#[case] action: CrudAction, #[case] method: Method, #[case] suffix: &str) {
        assert_eq!(action.method(), method);
        assert_eq!(action.suffix(), suffix);
    }

    #[test]
    fn test_only_store_creates() {
        for action in CrudAction::ALL {
            let expected = if action == CrudAction::Store {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            assert_eq!(action.success_status(), expected);
        }
    }
}
