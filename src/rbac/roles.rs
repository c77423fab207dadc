//! Static role table assembled from feature contributions.

use serde::Serialize;
use std::collections::BTreeMap;

use super::ability::{Ability, PermissionAction, ALL_SUBJECTS};
use crate::error::CompositionError;

/// Implicit role of every authenticated requester.
pub const USER_ROLE: &str = "user";
/// Role that manages every subject.
pub const SUPER_ADMIN_ROLE: &str = "super-admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionDef {
    pub name: String,
    pub action: PermissionAction,
    pub subject: String,
}

impl PermissionDef {
    pub fn new(name: impl Into<String>, action: PermissionAction, subject: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action,
            subject: subject.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDef {
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    /// Permission names
    pub permissions: Vec<String>,
}

impl RoleDef {
    pub fn new<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            label: None,
            description: None,
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>, description: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self.description = Some(description.into());
        self
    }
}

/// Permissions and roles one feature adds to the role table.
#[derive(Debug, Clone, Default)]
pub struct RbacContribution {
    pub permissions: Vec<PermissionDef>,
    pub roles: Vec<RoleDef>,
}

impl RbacContribution {
    /// `{subject}.create|read|update|delete|manage` permissions.
    pub fn crud(subject: &str) -> Self {
        let permissions = [
            PermissionAction::Create,
            PermissionAction::Read,
            PermissionAction::Update,
            PermissionAction::Delete,
            PermissionAction::Manage,
        ]
        .into_iter()
        .map(|action| PermissionDef::new(format!("{}.{}", subject, action), action, subject))
        .collect();
        Self {
            permissions,
            roles: Vec::new(),
        }
    }

    pub fn permission(mut self, permission: PermissionDef) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn role(mut self, role: RoleDef) -> Self {
        self.roles.push(role);
        self
    }

    /// The system roles every deployment has.
    pub fn system() -> Self {
        Self::default()
            .permission(PermissionDef::new(
                "system.manage",
                PermissionAction::Manage,
                ALL_SUBJECTS,
            ))
            .role(RoleDef::new(USER_ROLE, Vec::<String>::new()).with_label("User", "Default role of every signed-in account"))
            .role(
                RoleDef::new(SUPER_ADMIN_ROLE, ["system.manage"])
                    .with_label("Super admin", "Manages every resource"),
            )
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    permissions: BTreeMap<String, PermissionDef>,
    roles: BTreeMap<String, RoleDef>,
}

impl RoleTable {
    /// Union all contributions. Same-named roles merge their permission
    /// lists; a role naming an undefined permission is rejected.
    pub fn build<'a, I>(contributions: I) -> Result<Self, CompositionError>
    where
        I: IntoIterator<Item = &'a RbacContribution>,
    {
        let contributions: Vec<&RbacContribution> = contributions.into_iter().collect();
        let mut table = RoleTable::default();

        for contribution in &contributions {
            for permission in &contribution.permissions {
                table
                    .permissions
                    .entry(permission.name.clone())
                    .or_insert_with(|| permission.clone());
            }
        }

        for contribution in &contributions {
            for role in &contribution.roles {
                for permission in &role.permissions {
                    if !table.permissions.contains_key(permission) {
                        return Err(CompositionError::UnknownPermission {
                            role: role.name.clone(),
                            permission: permission.clone(),
                        });
                    }
                }
                match table.roles.get_mut(&role.name) {
                    Some(existing) => {
                        for permission in &role.permissions {
                            if !existing.permissions.contains(permission) {
                                existing.permissions.push(permission.clone());
                            }
                        }
                        if existing.label.is_none() {
                            existing.label = role.label.clone();
                            existing.description = role.description.clone();
                        }
                    }
                    None => {
                        table.roles.insert(role.name.clone(), role.clone());
                    }
                }
            }
        }

        tracing::debug!(
            roles = table.roles.len(),
            permissions = table.permissions.len(),
            "Role table built"
        );
        Ok(table)
    }

    /// Abilities granted by `roles`. Unknown role names grant nothing.
    pub fn build_ability<S: AsRef<str>>(&self, roles: &[S]) -> Ability {
        Ability::new(
            roles
                .iter()
                .filter_map(|name| self.roles.get(name.as_ref()))
                .flat_map(|role| role.permissions.iter())
                .filter_map(|name| self.permissions.get(name))
                .map(|p| (p.action, p.subject.clone())),
        )
    }

    pub fn role(&self, name: &str) -> Option<&RoleDef> {
        self.roles.get(name)
    }

    pub fn roles(&self) -> impl Iterator<Item = &RoleDef> {
        self.roles.values()
    }

    pub fn permission(&self, name: &str) -> Option<&PermissionDef> {
        self.permissions.get(name)
    }
}
