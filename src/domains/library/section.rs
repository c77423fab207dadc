//! Child subjects of a catalogue: manga chapters and images, novel volumes
//! and chapters. A child points at its parent through an id field, lists in
//! reading order and can keep a counter on the parent up to date.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::guarded_manifest;
use crate::domain::{ListScope, Record, RecordService, Visibility};
use crate::error::{AppError, Result};
use crate::restful::dto::{DeleteDto, ListQuery, RestoreDto, TrashedFilter};
use crate::restful::{
    BaseController, CrudAction, CrudController, InputShape, RouteInput, RouteManifest,
};

#[derive(Clone)]
pub struct Section {
    pub subject: &'static str,
    pub path: &'static str,
    /// Subject of the parent records: the catalogue or an earlier section
    pub parent: &'static str,
    /// Data key holding the parent record id
    pub parent_key: &'static str,
    /// Parent fields copied onto every new child
    pub inherit: &'static [&'static str],
    /// Parent field holding the number of live children
    pub count_field: Option<&'static str>,
    /// Numeric field children are listed by, ascending
    pub order_key: &'static str,
    pub filters: &'static [&'static str],
    pub list: Arc<dyn InputShape>,
    pub store: Arc<dyn InputShape>,
    pub update: Arc<dyn InputShape>,
}

impl Section {
    pub fn manifest(&self, allow_guest: bool) -> RouteManifest {
        guarded_manifest(
            self.subject,
            allow_guest,
            [self.list.clone(), self.store.clone(), self.update.clone()],
        )
    }
}

pub struct SectionController {
    section: Section,
    base: BaseController,
    parents: Arc<RecordService>,
}

impl SectionController {
    pub fn new(section: Section, service: Arc<RecordService>, parents: Arc<RecordService>) -> Self {
        let base = BaseController::new(section.subject, section.path, service);
        Self {
            section,
            base,
            parents,
        }
    }

    async fn list(&self, input: &RouteInput) -> Result<Value> {
        let query: ListQuery = input.decode()?;
        let ordered = ListScope::default().order_by(self.section.order_key);
        let scope = self.section.filters.iter().fold(ordered, |scope, key| {
            scope.field(key, input.input.get(*key).filter(|v| !v.is_null()).cloned())
        });
        let page = self
            .base
            .service()
            .paginate_scoped(&query, Visibility::all(), scope)
            .await?;
        Ok(serde_json::to_value(page)?)
    }

    async fn store(&self, input: &RouteInput) -> Result<Value> {
        let mut fields = input.fields()?;
        let parent = self.parent_of(&fields).await?;
        for key in self.section.inherit {
            if let Some(value) = parent.data.get(*key) {
                fields.insert(key.to_string(), value.clone());
            }
        }
        fields.insert("publish".to_string(), json!(true));

        let owner = input.requester_id().unwrap_or(Uuid::nil());
        let record = self.base.service().create(owner, fields).await?;
        self.refresh_counts([parent.id]).await?;
        Ok(serde_json::to_value(record)?)
    }

    async fn delete(&self, input: &RouteInput) -> Result<Value> {
        let dto: DeleteDto = input.decode()?;
        let records = self
            .base
            .service()
            .delete(&dto.items, dto.trash.unwrap_or(true))
            .await?;
        self.refresh_counts(self.parent_ids(&records)).await?;
        Ok(serde_json::to_value(records)?)
    }

    async fn restore(&self, input: &RouteInput) -> Result<Value> {
        let dto: RestoreDto = input.decode()?;
        let records = self.base.service().restore(&dto.items).await?;
        self.refresh_counts(self.parent_ids(&records)).await?;
        Ok(serde_json::to_value(records)?)
    }

    /// The live parent named by the input; a missing one is an input error.
    async fn parent_of(&self, fields: &Map<String, Value>) -> Result<Record> {
        let key = self.section.parent_key;
        let id = fields
            .get(key)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| AppError::Validation(format!("{} is required", key)))?;

        match self
            .parents
            .detail(id, TrashedFilter::None, Visibility::all())
            .await
        {
            Err(AppError::NotFound(_)) => Err(AppError::Validation(format!(
                "{} {} does not exist",
                self.section.parent, id
            ))),
            other => other,
        }
    }

    fn parent_ids(&self, records: &[Record]) -> Vec<Uuid> {
        records
            .iter()
            .filter_map(|r| r.data.get(self.section.parent_key))
            .filter_map(Value::as_str)
            .filter_map(|s| Uuid::parse_str(s).ok())
            .collect()
    }

    async fn refresh_counts(&self, parents: impl IntoIterator<Item = Uuid>) -> Result<()> {
        let Some(field) = self.section.count_field else {
            return Ok(());
        };
        let mut seen = HashSet::new();
        for parent in parents.into_iter().filter(|id| seen.insert(*id)) {
            let scope = ListScope::default().field(self.section.parent_key, Some(json!(parent)));
            let total = self.base.service().count(scope).await?;

            let mut changes = Map::new();
            changes.insert(field.to_string(), json!(total));
            match self.parents.update(parent, changes).await {
                // A trashed parent keeps its last count
                Ok(_) | Err(AppError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
            tracing::debug!(
                subject = %self.section.parent,
                id = %parent,
                field,
                total,
                "Child count refreshed"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl CrudController for SectionController {
    fn resource(&self) -> &str {
        self.base.resource()
    }

    fn path(&self) -> &str {
        self.base.path()
    }

    async fn handle(&self, action: CrudAction, input: RouteInput) -> Result<Value> {
        match action {
            CrudAction::List => self.list(&input).await,
            CrudAction::Store => self.store(&input).await,
            CrudAction::Delete => self.delete(&input).await,
            CrudAction::Restore => self.restore(&input).await,
            other => self.base.handle(other, input).await,
        }
    }
}
