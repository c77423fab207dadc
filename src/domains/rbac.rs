//! The `rbac` feature: system roles and the `rbac:roles` command.

use serde_json::Value;
use std::sync::Arc;

use crate::cli::{ArgSpec, Command};
use crate::config::Configure;
use crate::module::{FeatureDescriptor, Provider};
use crate::rbac::{RbacContribution, RoleDef, RoleTable};

pub const FEATURE: &str = "rbac";

pub async fn build(_configure: Arc<Configure>, _params: Value) -> anyhow::Result<FeatureDescriptor> {
    Ok(FeatureDescriptor::new()
        .global()
        .provide_exported(Provider::value("rbac.system", RbacContribution::system()))
        .command(roles_command()))
}

fn roles_command() -> Command {
    Command::new("rbac:roles", "Print the role table", |ctx| async move {
        let filter = ctx.value("role");
        for line in render_roles(ctx.app.role_table(), filter.as_deref())? {
            println!("{}", line);
        }
        Ok(())
    })
    .arg(ArgSpec::option("role", "Only print this role"))
}

/// One line per role: name, label and the actions it grants.
pub fn render_roles(table: &RoleTable, only: Option<&str>) -> anyhow::Result<Vec<String>> {
    let roles: Vec<&RoleDef> = table
        .roles()
        .filter(|role| only.map_or(true, |name| role.name == name))
        .collect();
    if let (Some(name), true) = (only, roles.is_empty()) {
        anyhow::bail!("unknown role `{}`", name);
    }

    Ok(roles
        .into_iter()
        .map(|role| {
            let grants: Vec<String> = role
                .permissions
                .iter()
                .filter_map(|name| table.permission(name))
                .map(|p| format!("{}:{}", p.action, p.subject))
                .collect();
            format!(
                "{:<16} {:<16} {}",
                role.name,
                role.label.as_deref().unwrap_or("-"),
                if grants.is_empty() { "-".to_string() } else { grants.join(", ") }
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::SUPER_ADMIN_ROLE;

    fn table() -> RoleTable {
        RoleTable::build([&RbacContribution::system()]).unwrap()
    }

    #[test]
    fn test_render_all_roles() {
        let lines = render_roles(&table(), None).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|l| l.starts_with(SUPER_ADMIN_ROLE) && l.ends_with("manage:all")));
    }

    #[test]
    fn test_render_one_role() {
        let lines = render_roles(&table(), Some("user")).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with('-'));
    }

    #[test]
    fn test_unknown_role_is_an_error() {
        assert!(render_roles(&table(), Some("ghost")).is_err());
    }

    #[tokio::test]
    async fn test_feature_is_global_and_exports_system_roles() {
        let configure = Arc::new(Configure::with_overrides([("jwt.secret", "s")]).unwrap());
        let descriptor = build(configure, Value::Null).await.unwrap();
        assert!(descriptor.global);
        assert_eq!(descriptor.exports.len(), 1);
        assert_eq!(descriptor.commands[0].name(), "rbac:roles");
    }
}
