//! Route-level authorization.

use metrics::counter;

use super::checker::Checker;
use super::context::RequestContext;
use super::engine::evaluate;
use super::lookup::OwnerLookup;
use super::roles::{RoleTable, USER_ROLE};
use crate::error::{AppError, Result};

/// Authorization requirements of one resolved route.
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard<'a> {
    pub resource: &'a str,
    pub action: &'a str,
    pub checkers: &'a [Checker],
    pub guest: bool,
}

/// Decide whether the request may reach the handler.
///
/// Guest routes always pass. Otherwise an identity is required, and a
/// non-empty checker chain must pass.
pub async fn authorize(
    guard: RouteGuard<'_>,
    roles: &RoleTable,
    lookup: &dyn OwnerLookup,
    ctx: &RequestContext,
) -> Result<()> {
    if guard.guest {
        record("guest");
        return Ok(());
    }

    let Some(requester) = ctx.requester.as_ref() else {
        record("unauthenticated");
        tracing::debug!(resource = guard.resource, action = guard.action, "Anonymous request denied");
        return Err(AppError::Unauthorized(
            "Authentication required".to_string(),
        ));
    };

    if guard.checkers.is_empty() {
        record("allowed");
        return Ok(());
    }

    let mut role_names: Vec<&str> = requester.roles.iter().map(String::as_str).collect();
    if !role_names.contains(&USER_ROLE) {
        role_names.push(USER_ROLE);
    }
    let ability = roles.build_ability(&role_names);

    match evaluate(guard.checkers, &ability, ctx, lookup).await {
        Ok(true) => {
            record("allowed");
            Ok(())
        }
        Ok(false) => {
            record("forbidden");
            tracing::info!(
                resource = guard.resource,
                action = guard.action,
                user_id = %requester.user_id,
                "Capability check denied"
            );
            Err(AppError::Forbidden(format!(
                "Not allowed to {} {}",
                guard.action, guard.resource
            )))
        }
        Err(e) => {
            record("error");
            Err(e)
        }
    }
}

fn record(outcome: &'static str) {
    counter!("folio_authz_decisions_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::AuthUser;
    use crate::rbac::ability::PermissionAction;
    use crate::rbac::lookup::MockOwnerLookup;
    use crate::rbac::roles::{RbacContribution, RoleDef};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn role_table() -> RoleTable {
        let post = RbacContribution::crud("post")
            .role(RoleDef::new(USER_ROLE, ["post.read"]))
            .role(RoleDef::new("post-editor", ["post.create", "post.update"]));
        RoleTable::build([&RbacContribution::system(), &post]).unwrap()
    }

    fn user(roles: &[&str]) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn guard<'a>(checkers: &'a [Checker], guest: bool) -> RouteGuard<'a> {
        RouteGuard {
            resource: "post",
            action: "update",
            checkers,
            guest,
        }
    }

    #[tokio::test]
    async fn test_guest_route_never_requires_identity() {
        let lookup = MockOwnerLookup::new();
        let checkers = [Checker::can(PermissionAction::Manage, "post")];
        let ctx = RequestContext::new(None);

        let result = authorize(guard(&checkers, true), &role_table(), &lookup, &ctx).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_anonymous_on_protected_route_is_unauthorized() {
        let lookup = MockOwnerLookup::new();
        let ctx = RequestContext::new(None);

        let result = authorize(guard(&[], false), &role_table(), &lookup, &ctx).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_empty_chain_only_needs_identity() {
        let lookup = MockOwnerLookup::new();
        let ctx = RequestContext::new(Some(user(&[])));

        assert!(authorize(guard(&[], false), &role_table(), &lookup, &ctx)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_implicit_user_role() {
        let lookup = MockOwnerLookup::new();
        let checkers = [Checker::can(PermissionAction::Read, "post")];
        let ctx = RequestContext::new(Some(user(&[])));

        assert!(authorize(guard(&checkers, false), &role_table(), &lookup, &ctx)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_foreign_record_without_permission_is_forbidden() {
        let mut lookup = MockOwnerLookup::new();
        lookup
            .expect_fetch_owners_by_ids()
            .returning(|_, ids| Ok(ids.iter().map(|id| (*id, Uuid::new_v4())).collect::<HashMap<_, _>>()));
        let checkers = [
            Checker::can(PermissionAction::Update, "post"),
            Checker::owner("post"),
        ];
        let ctx = RequestContext::new(Some(user(&[]))).with_path_item(Uuid::new_v4());

        let result = authorize(guard(&checkers, false), &role_table(), &lookup, &ctx).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_role_permission_allows_foreign_record() {
        let mut lookup = MockOwnerLookup::new();
        lookup.expect_fetch_owners_by_ids().never();
        let checkers = [
            Checker::can(PermissionAction::Update, "post"),
            Checker::owner("post"),
        ];
        let ctx = RequestContext::new(Some(user(&["post-editor"]))).with_path_item(Uuid::new_v4());

        assert!(authorize(guard(&checkers, false), &role_table(), &lookup, &ctx)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_forbidden() {
        let mut lookup = MockOwnerLookup::new();
        lookup
            .expect_fetch_owners_by_ids()
            .returning(|_, _| Err(AppError::CapabilityLookup("store offline".into())));
        let checkers = [Checker::owner("post")];
        let ctx = RequestContext::new(Some(user(&[]))).with_path_item(Uuid::new_v4());

        let result = authorize(guard(&checkers, false), &role_table(), &lookup, &ctx).await;
        assert!(matches!(result, Err(AppError::CapabilityLookup(_))));
    }
}
