//! Capability checkers attached to routes.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::ability::{Ability, PermissionAction};
use super::context::RequestContext;

pub type StaticPredicate = Arc<dyn Fn(&Ability, &RequestContext) -> bool + Send + Sync>;

/// Extracts the record ids an ownership check covers. `None` denies.
pub type IdExtractor = Arc<dyn Fn(&RequestContext) -> Option<Vec<Uuid>> + Send + Sync>;

/// One link in a route's checker chain. A chain passes when any link passes.
#[derive(Clone)]
pub enum Checker {
    /// Decided from the ability set and the request alone
    Static(StaticPredicate),
    /// Passes when the requester owns every referenced `subject` record
    Ownership { subject: String, ids: IdExtractor },
}

impl Checker {
    /// Passes when the ability grants `action` on `subject`.
    pub fn can(action: PermissionAction, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        Checker::Static(Arc::new(move |ability, _| ability.can(action, &subject)))
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Ability, &RequestContext) -> bool + Send + Sync + 'static,
    {
        Checker::Static(Arc::new(f))
    }

    /// Ownership over the ids the request refers to.
    pub fn owner(subject: impl Into<String>) -> Self {
        Self::owner_with(subject, RequestContext::target_ids)
    }

    pub fn owner_with<F>(subject: impl Into<String>, ids: F) -> Self
    where
        F: Fn(&RequestContext) -> Option<Vec<Uuid>> + Send + Sync + 'static,
    {
        Checker::Ownership {
            subject: subject.into(),
            ids: Arc::new(ids),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Checker::Static(_))
    }
}

impl fmt::Debug for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checker::Static(_) => f.write_str("Static"),
            Checker::Ownership { subject, .. } => {
                f.debug_struct("Ownership").field("subject", subject).finish()
            }
        }
    }
}
