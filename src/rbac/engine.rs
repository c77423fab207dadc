//! Checker chain evaluation.

use std::collections::HashMap;
use uuid::Uuid;

use super::ability::Ability;
use super::checker::Checker;
use super::context::RequestContext;
use super::lookup::OwnerLookup;
use crate::error::{AppError, Result};

/// Logical OR over `checkers`.
///
/// Static checkers run first. Ownership checkers are grouped by subject and
/// each subject costs one lookup, issued only if nothing before it passed.
/// Ownership fails closed: no requester, no ids, malformed ids or ids with no
/// record all deny. A lookup failure is an error, not a denial.
pub async fn evaluate(
    checkers: &[Checker],
    ability: &Ability,
    ctx: &RequestContext,
    lookup: &dyn OwnerLookup,
) -> Result<bool> {
    for checker in checkers {
        if let Checker::Static(predicate) = checker {
            if predicate(ability, ctx) {
                return Ok(true);
            }
        }
    }

    let Some(requester) = ctx.requester_id() else {
        return Ok(false);
    };

    // subject -> id sets of each ownership checker on it, in first-seen order
    let mut batches: Vec<(&str, Vec<Vec<Uuid>>)> = Vec::new();
    for checker in checkers {
        let Checker::Ownership { subject, ids } = checker else {
            continue;
        };
        let ids = match ids(ctx) {
            Some(ids) if !ids.is_empty() => ids,
            _ => continue,
        };
        match batches.iter_mut().find(|(s, _)| *s == subject.as_str()) {
            Some((_, sets)) => sets.push(ids),
            None => batches.push((subject.as_str(), vec![ids])),
        }
    }

    for (subject, sets) in batches {
        let mut wanted: Vec<Uuid> = sets.iter().flatten().copied().collect();
        wanted.sort_unstable();
        wanted.dedup();

        let owners = fetch(lookup, subject, &wanted).await?;
        if sets.iter().any(|ids| owns_all(&owners, ids, requester)) {
            return Ok(true);
        }
    }

    Ok(false)
}

async fn fetch(
    lookup: &dyn OwnerLookup,
    subject: &str,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Uuid>> {
    lookup
        .fetch_owners_by_ids(subject, ids)
        .await
        .map_err(|e| match e {
            AppError::CapabilityLookup(msg) => AppError::CapabilityLookup(msg),
            other => AppError::CapabilityLookup(format!("{}: {}", subject, other)),
        })
}

fn owns_all(owners: &HashMap<Uuid, Uuid>, ids: &[Uuid], requester: Uuid) -> bool {
    ids.iter()
        .all(|id| owners.get(id).is_some_and(|owner| *owner == requester))
}
