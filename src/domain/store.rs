//! Record storage

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::record::Record;
use crate::error::Result;
use crate::restful::dto::TrashedFilter;

/// Inclusive numeric bounds on one `data` field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRange {
    pub key: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldRange {
    fn contains(&self, value: Option<&Value>) -> bool {
        let Some(value) = value.and_then(Value::as_f64) else {
            return false;
        };
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Filter for paginated listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub trashed: TrashedFilter,
    /// Only published records, plus the viewer's own
    pub published_only: bool,
    pub viewer: Option<Uuid>,
    /// Case-insensitive substring matched against these `data` fields
    pub search: Option<(String, Vec<String>)>,
    pub owner: Option<Uuid>,
    /// Published (`true`) or draft (`false`) records only
    pub published: Option<bool>,
    /// `data` fields that must equal the given value, or contain it when the
    /// field is an array
    pub fields: Map<String, Value>,
    pub ranges: Vec<FieldRange>,
    /// Sort ascending by this numeric `data` field instead of newest first
    pub order_by: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &Record) -> bool {
        let trashed_ok = match self.trashed {
            TrashedFilter::None => !record.is_trashed(),
            TrashedFilter::Only => record.is_trashed(),
            TrashedFilter::All => true,
        };
        let visible = !self.published_only || record.visible_to(self.viewer);
        let found = match &self.search {
            None => true,
            Some((term, fields)) => {
                let term = term.to_lowercase();
                let hit = |v: &Value| v.as_str().is_some_and(|s| s.to_lowercase().contains(&term));
                fields.iter().any(|field| match record.data.get(field) {
                    Some(Value::Array(items)) => items.iter().any(hit),
                    Some(value) => hit(value),
                    None => false,
                })
            }
        };
        let owned = self.owner.map_or(true, |owner| record.owner_id == owner);
        let state_ok = self
            .published
            .map_or(true, |published| record.is_published() == published);
        let fields_ok = self.fields.iter().all(|(key, expected)| match record.data.get(key) {
            Some(Value::Array(items)) => items.contains(expected),
            Some(value) => value == expected,
            None => false,
        });
        let ranges_ok = self
            .ranges
            .iter()
            .all(|range| range.contains(record.data.get(&range.key)));
        trashed_ok && visible && found && owned && state_ok && fields_ok && ranges_ok
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// One page of matching records, newest first, and the total match count.
    async fn paginate(&self, filter: &RecordFilter, page: u32, limit: u32)
        -> Result<(Vec<Record>, u64)>;
    async fn find_by_ids(&self, ids: &[Uuid], trashed: TrashedFilter) -> Result<Vec<Record>>;
    /// Insert or replace by id.
    async fn save(&self, record: Record) -> Result<Record>;
    /// Insert `record` unless a stored record, trashed or not, holds the same
    /// value in `field`. Returns `None` when the value is taken.
    async fn insert_unique(&self, record: Record, field: &str) -> Result<Option<Record>>;
    /// Permanently remove; returns how many records were removed.
    async fn remove(&self, ids: &[Uuid]) -> Result<u64>;
}

/// Process-local store
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn paginate(
        &self,
        filter: &RecordFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Record>, u64)> {
        let records = self.records.read().await;
        let mut matching: Vec<&Record> = records.iter().filter(|r| filter.matches(r)).collect();
        match &filter.order_by {
            Some(key) => {
                let rank = |r: &Record| r.data.get(key).and_then(Value::as_f64).unwrap_or(f64::MAX);
                matching.sort_by(|a, b| {
                    rank(a)
                        .total_cmp(&rank(b))
                        .then(a.created_at.cmp(&b.created_at))
                });
            }
            None => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        let total = matching.len() as u64;
        let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn find_by_ids(&self, ids: &[Uuid], trashed: TrashedFilter) -> Result<Vec<Record>> {
        let filter = RecordFilter {
            trashed,
            ..Default::default()
        };
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| ids.contains(&r.id) && filter.matches(r))
            .cloned()
            .collect())
    }

    async fn save(&self, record: Record) -> Result<Record> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(record)
    }

    async fn insert_unique(&self, record: Record, field: &str) -> Result<Option<Record>> {
        let mut records = self.records.write().await;
        if let Some(value) = record.data.get(field) {
            if records.iter().any(|r| r.data.get(field) == Some(value)) {
                return Ok(None);
            }
        }
        records.push(record.clone());
        Ok(Some(record))
    }

    async fn remove(&self, ids: &[Uuid]) -> Result<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        Ok((before - records.len()) as u64)
    }
}
