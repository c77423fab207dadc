//! Generic CRUD business logic over a record store

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::record::Record;
use super::search::SearchIndex;
use super::store::{FieldRange, RecordFilter, RecordStore};
use crate::error::{AppError, Result};
use crate::restful::dto::{ListQuery, PaginatedResponse, TrashedFilter};

/// Data key that toggles the published mark instead of being stored.
const PUBLISH_KEY: &str = "publish";

/// Who is reading and whether unpublished records are hidden from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visibility {
    pub published_only: bool,
    pub viewer: Option<Uuid>,
}

impl Visibility {
    /// Everything, regardless of publication
    pub fn all() -> Self {
        Self::default()
    }

    /// Published records plus the viewer's own
    pub fn published(viewer: Option<Uuid>) -> Self {
        Self {
            published_only: true,
            viewer,
        }
    }
}

/// Extra narrowing of a listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListScope {
    pub owner: Option<Uuid>,
    pub published: Option<bool>,
    pub fields: Map<String, Value>,
    pub ranges: Vec<FieldRange>,
    pub order_by: Option<String>,
}

impl ListScope {
    pub fn owner(mut self, owner: Option<Uuid>) -> Self {
        self.owner = owner;
        self
    }

    pub fn published(mut self, published: Option<bool>) -> Self {
        self.published = published;
        self
    }

    /// Require `key` to equal `value`; a `None` value leaves the scope unchanged.
    pub fn field(mut self, key: &str, value: Option<Value>) -> Self {
        if let Some(value) = value {
            self.fields.insert(key.to_string(), value);
        }
        self
    }

    /// Bound the numeric field `key`; without bounds the scope is unchanged.
    pub fn range(mut self, key: &str, min: Option<f64>, max: Option<f64>) -> Self {
        if min.is_some() || max.is_some() {
            self.ranges.push(FieldRange {
                key: key.to_string(),
                min,
                max,
            });
        }
        self
    }

    /// List ascending by the numeric field `key`.
    pub fn order_by(mut self, key: &str) -> Self {
        self.order_by = Some(key.to_string());
        self
    }
}

pub struct RecordService {
    subject: String,
    store: Arc<dyn RecordStore>,
    search: Option<Arc<SearchIndex>>,
}

impl RecordService {
    pub fn new(subject: impl Into<String>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            subject: subject.into(),
            store,
            search: None,
        }
    }

    pub fn with_search(mut self, search: Option<Arc<SearchIndex>>) -> Self {
        self.search = search;
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub async fn paginate(
        &self,
        query: &ListQuery,
        visibility: Visibility,
    ) -> Result<PaginatedResponse<Record>> {
        self.paginate_scoped(query, visibility, ListScope::default())
            .await
    }

    /// Like [`RecordService::paginate`], narrowed to an owner and field values.
    pub async fn paginate_scoped(
        &self,
        query: &ListQuery,
        visibility: Visibility,
        scope: ListScope,
    ) -> Result<PaginatedResponse<Record>> {
        let search = match (&query.search, &self.search) {
            (Some(term), Some(index)) if !term.is_empty() => {
                Some((term.clone(), index.fields().to_vec()))
            }
            (Some(_), None) => {
                tracing::debug!(subject = %self.subject, "No search index, ignoring search term");
                None
            }
            _ => None,
        };
        let filter = RecordFilter {
            trashed: query.trashed,
            published_only: visibility.published_only,
            viewer: visibility.viewer,
            search,
            owner: scope.owner,
            published: scope.published,
            fields: scope.fields,
            ranges: scope.ranges,
            order_by: scope.order_by,
        };

        let (items, total) = self.store.paginate(&filter, query.page, query.limit).await?;
        Ok(PaginatedResponse::new(items, query.page, query.limit, total))
    }

    /// Number of live records inside `scope`, published or not.
    pub async fn count(&self, scope: ListScope) -> Result<u64> {
        let filter = RecordFilter {
            owner: scope.owner,
            published: scope.published,
            fields: scope.fields,
            ranges: scope.ranges,
            ..RecordFilter::default()
        };
        let (_, total) = self.store.paginate(&filter, 1, 1).await?;
        Ok(total)
    }

    pub async fn detail(
        &self,
        id: Uuid,
        trashed: TrashedFilter,
        visibility: Visibility,
    ) -> Result<Record> {
        self.store
            .find_by_ids(&[id], trashed)
            .await?
            .into_iter()
            .find(|r| !visibility.published_only || r.visible_to(visibility.viewer))
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn create(&self, owner_id: Uuid, data: Map<String, Value>) -> Result<Record> {
        self.insert(Record::new(owner_id, Map::new()), data).await
    }

    /// Create a record with a caller-chosen id, refused with a conflict when
    /// any stored record, trashed ones included, shares its `unique` field.
    pub async fn create_unique(
        &self,
        id: Uuid,
        owner_id: Uuid,
        data: Map<String, Value>,
        unique: &str,
    ) -> Result<Record> {
        let mut record = Record::with_id(id, owner_id, Map::new());
        apply_changes(&mut record, data);
        let value = record.data.get(unique).cloned().unwrap_or(Value::Null);

        match self.store.insert_unique(record, unique).await? {
            Some(record) => {
                tracing::info!(subject = %self.subject, id = %record.id, "Record created");
                Ok(record)
            }
            None => Err(AppError::Conflict(format!(
                "{} with {} {} already exists",
                self.subject, unique, value
            ))),
        }
    }

    async fn insert(&self, mut record: Record, data: Map<String, Value>) -> Result<Record> {
        apply_changes(&mut record, data);
        let record = self.store.save(record).await?;
        tracing::info!(subject = %self.subject, id = %record.id, "Record created");
        Ok(record)
    }

    pub async fn update(&self, id: Uuid, data: Map<String, Value>) -> Result<Record> {
        let mut record = self.detail(id, TrashedFilter::None, Visibility::all()).await?;
        apply_changes(&mut record, data);
        record.updated_at = Utc::now();
        self.store.save(record).await
    }

    /// With `trash`, live records move to the trash and records already in
    /// it are removed; without it every record is removed.
    pub async fn delete(&self, ids: &[Uuid], trash: bool) -> Result<Vec<Record>> {
        let records = self.store.find_by_ids(ids, TrashedFilter::All).await?;
        let mut removed = Vec::new();
        let mut affected = Vec::with_capacity(records.len());

        for mut record in records {
            if trash && !record.is_trashed() {
                record.deleted_at = Some(Utc::now());
                affected.push(self.store.save(record).await?);
            } else {
                removed.push(record.id);
                affected.push(record);
            }
        }
        if !removed.is_empty() {
            self.store.remove(&removed).await?;
        }

        tracing::info!(
            subject = %self.subject,
            count = affected.len(),
            removed = removed.len(),
            "Records deleted"
        );
        Ok(affected)
    }

    pub async fn restore(&self, ids: &[Uuid]) -> Result<Vec<Record>> {
        let trashed = self.store.find_by_ids(ids, TrashedFilter::Only).await?;
        let mut restored = Vec::with_capacity(trashed.len());
        for mut record in trashed {
            record.deleted_at = None;
            record.updated_at = Utc::now();
            restored.push(self.store.save(record).await?);
        }
        Ok(restored)
    }

    fn not_found(&self, id: Uuid) -> AppError {
        AppError::NotFound(format!("{} {} not found", self.subject, id))
    }
}

fn apply_changes(record: &mut Record, mut data: Map<String, Value>) {
    match data.remove(PUBLISH_KEY) {
        Some(Value::Bool(true)) if record.published_at.is_none() => {
            record.published_at = Some(Utc::now())
        }
        Some(Value::Bool(false)) => record.published_at = None,
        _ => {}
    }
    for (key, value) in data {
        if value.is_null() {
            record.data.remove(&key);
        } else {
            record.data.insert(key, value);
        }
    }
}
