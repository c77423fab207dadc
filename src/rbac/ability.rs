//! Per-request ability set.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Subject matching every other subject.
pub const ALL_SUBJECTS: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    Create,
    Read,
    Update,
    Delete,
    /// Implies every other action on the same subject
    Manage,
}

impl PermissionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionAction::Create => "create",
            PermissionAction::Read => "read",
            PermissionAction::Update => "update",
            PermissionAction::Delete => "delete",
            PermissionAction::Manage => "manage",
        }
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(PermissionAction::Create),
            "read" => Ok(PermissionAction::Read),
            "update" => Ok(PermissionAction::Update),
            "delete" => Ok(PermissionAction::Delete),
            "manage" => Ok(PermissionAction::Manage),
            other => Err(format!("unknown permission action: {}", other)),
        }
    }
}

/// Read-only set of `(action, subject)` pairs granted to one requester.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ability {
    rules: HashSet<(PermissionAction, String)>,
}

impl Ability {
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = (PermissionAction, S)>,
        S: Into<String>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|(action, subject)| (action, subject.into()))
                .collect(),
        }
    }

    pub fn can(&self, action: PermissionAction, subject: &str) -> bool {
        [subject, ALL_SUBJECTS].iter().any(|s| {
            self.rules.contains(&(action, (*s).to_string()))
                || self.rules.contains(&(PermissionAction::Manage, (*s).to_string()))
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
