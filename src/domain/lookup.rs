//! Owner lookup over the record stores of every subject

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::store::RecordStore;
use crate::error::{AppError, Result};
use crate::rbac::OwnerLookup;
use crate::restful::dto::TrashedFilter;

/// A subject's store, published by its feature so ownership checks can
/// reach it.
#[derive(Clone)]
pub struct SubjectStore {
    pub subject: String,
    pub store: Arc<dyn RecordStore>,
}

impl SubjectStore {
    pub fn new(subject: impl Into<String>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            subject: subject.into(),
            store,
        }
    }
}

pub struct StoreOwnerLookup {
    stores: HashMap<String, Arc<dyn RecordStore>>,
}

impl StoreOwnerLookup {
    pub fn new<'a>(subjects: impl IntoIterator<Item = &'a SubjectStore>) -> Self {
        Self {
            stores: subjects
                .into_iter()
                .map(|s| (s.subject.clone(), s.store.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl OwnerLookup for StoreOwnerLookup {
    async fn fetch_owners_by_ids(
        &self,
        subject: &str,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Uuid>> {
        let store = self.stores.get(subject).ok_or_else(|| {
            AppError::CapabilityLookup(format!("no record store for subject `{}`", subject))
        })?;

        let records = store.find_by_ids(ids, TrashedFilter::All).await?;
        Ok(records.into_iter().map(|r| (r.id, r.owner_id)).collect())
    }
}
