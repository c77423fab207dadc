//! Shared plumbing of the catalogue features (`manga`, `novel`): a record
//! subject with editor and manager roles, equality and range filters on
//! listing, an optional search index and child sections.

pub mod section;

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Configure;
use crate::domain::{
    ListScope, MemoryRecordStore, RecordService, RecordStore, SearchIndex, SubjectStore, Visibility,
};
use crate::error::Result;
use crate::module::{FeatureDescriptor, Provider};
use crate::rbac::{Checker, PermissionAction, RbacContribution, RoleDef, USER_ROLE};
use crate::restful::dto::ListQuery;
use crate::restful::{
    manifest_factory, ActionOption, BaseController, CrudAction, CrudController, InputShape,
    RestfulResource, RouteInput, RouteManifest,
};

pub use section::{Section, SectionController};

/// Publication state of a serialized work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialStatus {
    #[default]
    Serializing,
    Completed,
    Paused,
}

/// Numeric bounds on a stored field, read from a pair of query keys.
#[derive(Debug, Clone, Copy)]
pub struct RangeFilter {
    pub field: &'static str,
    pub min: &'static str,
    pub max: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct RoleSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// Static description of one catalogue feature.
#[derive(Clone)]
pub struct Catalogue {
    pub feature: &'static str,
    pub subject: &'static str,
    pub path: &'static str,
    pub search_fields: &'static [&'static str],
    /// Query keys matched by equality against the stored field of the same name
    pub filters: &'static [&'static str],
    pub ranges: &'static [RangeFilter],
    pub editor: RoleSpec,
    pub manager: RoleSpec,
    pub list: Arc<dyn InputShape>,
    pub store: Arc<dyn InputShape>,
    pub update: Arc<dyn InputShape>,
    /// Child subjects, parents before their children
    pub sections: Vec<Section>,
}

/// CRUD manifest of `subject` with public reads. Writes need the matching
/// permission unless `allow_guest` opens them too.
pub fn guarded_manifest(
    subject: &str,
    allow_guest: bool,
    [list, store, update]: [Arc<dyn InputShape>; 3],
) -> RouteManifest {
    let option = |description: &str, action: Option<PermissionAction>| {
        let option = ActionOption::new().describe(format!("{} {}", description, subject));
        match (allow_guest, action) {
            (false, Some(action)) => option.checker(Checker::can(action, subject)),
            _ => option.guest(),
        }
    };

    RouteManifest::new(subject)
        .action("list", option("List", None))
        .action("detail", option("Show", None))
        .action("store", option("Create", Some(PermissionAction::Create)))
        .action("update", option("Update", Some(PermissionAction::Update)))
        .action("delete", option("Delete", Some(PermissionAction::Delete)))
        .action("restore", option("Restore", Some(PermissionAction::Manage)))
        .list_shape(list)
        .store_shape(store)
        .update_shape(update)
}

impl Catalogue {
    /// Editors and managers also manage every section.
    pub fn rbac(&self) -> RbacContribution {
        let permission = |action: &str| format!("{}.{}", self.subject, action);
        let sections: Vec<String> = self
            .sections
            .iter()
            .map(|section| format!("{}.manage", section.subject))
            .collect();

        let mut contribution = RbacContribution::crud(self.subject);
        for section in &self.sections {
            contribution
                .permissions
                .extend(RbacContribution::crud(section.subject).permissions);
        }
        contribution
            .role(RoleDef::new(USER_ROLE, [permission("read")]))
            .role(
                RoleDef::new(
                    self.editor.name,
                    [permission("create"), permission("read"), permission("update")]
                        .into_iter()
                        .chain(sections.iter().cloned()),
                )
                .with_label(self.editor.label, self.editor.description),
            )
            .role(
                RoleDef::new(
                    self.manager.name,
                    std::iter::once(permission("manage")).chain(sections),
                )
                .with_label(self.manager.label, self.manager.description),
            )
    }

    /// Reading is always public; with `allow_guest` every action is.
    pub fn manifest(&self, allow_guest: bool) -> RouteManifest {
        guarded_manifest(
            self.subject,
            allow_guest,
            [self.list.clone(), self.store.clone(), self.update.clone()],
        )
    }

    /// Descriptor of the feature. `params.allow_guest` opens every route.
    pub fn build(&self, configure: &Configure, params: &Value) -> anyhow::Result<FeatureDescriptor> {
        let allow_guest = params
            .get("allow_guest")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let search = configure
            .get("search.enabled", false)
            .then(|| Arc::new(SearchIndex::new(self.search_fields.iter().copied())));

        let service = Arc::new(
            RecordService::new(self.subject, store.clone()).with_search(search.clone()),
        );
        let controller = Arc::new(CatalogueController::new(self.clone(), service.clone()));
        let manifest = self.manifest(allow_guest);

        let mut descriptor = FeatureDescriptor::new()
            .import(super::user::FEATURE)
            .import(super::rbac::FEATURE)
            .provide_exported(Provider::shared(
                format!("{}.service", self.feature),
                service.clone(),
            ))
            .provide(Provider::value(
                format!("{}.store", self.feature),
                SubjectStore::new(self.subject, store),
            ))
            .provide(Provider::value(format!("{}.rbac", self.feature), self.rbac()))
            .provide(Provider::value(
                format!("{}.restful", self.feature),
                RestfulResource::new(
                    controller,
                    manifest_factory(move |_| {
                        let manifest = manifest.clone();
                        async move { Ok(manifest) }
                    }),
                ),
            ));
        if let Some(index) = search {
            descriptor =
                descriptor.provide(Provider::shared(format!("{}.search", self.feature), index));
        }

        let mut parents = HashMap::from([(self.subject, service)]);
        for section in &self.sections {
            let parent = parents.get(section.parent).cloned().ok_or_else(|| {
                anyhow!("section {} names unknown parent {}", section.subject, section.parent)
            })?;
            let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
            let service = Arc::new(RecordService::new(section.subject, store.clone()));
            let controller = Arc::new(SectionController::new(
                section.clone(),
                service.clone(),
                parent,
            ));
            let manifest = section.manifest(allow_guest);

            descriptor = descriptor
                .provide(Provider::value(
                    format!("{}.store", section.subject),
                    SubjectStore::new(section.subject, store),
                ))
                .provide(Provider::value(
                    format!("{}.restful", section.subject),
                    RestfulResource::new(
                        controller,
                        manifest_factory(move |_| {
                            let manifest = manifest.clone();
                            async move { Ok(manifest) }
                        }),
                    ),
                ));
            parents.insert(section.subject, service);
        }
        Ok(descriptor)
    }
}

pub struct CatalogueController {
    catalogue: Catalogue,
    base: BaseController,
}

impl CatalogueController {
    pub fn new(catalogue: Catalogue, service: Arc<RecordService>) -> Self {
        let base = BaseController::new(catalogue.subject, catalogue.path, service);
        Self { catalogue, base }
    }

    async fn list(&self, input: &RouteInput) -> Result<Value> {
        let query: ListQuery = input.decode()?;
        let bound = |key: &str| input.input.get(key).and_then(Value::as_f64);
        let ranged = self.catalogue.ranges.iter().fold(ListScope::default(), |scope, range| {
            scope.range(range.field, bound(range.min), bound(range.max))
        });
        let scope = self.catalogue.filters.iter().fold(ranged, |scope, key| {
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
        let owner = input.requester_id().unwrap_or(Uuid::nil());
        let mut fields = input.fields()?;
        fields.insert("publish".to_string(), json!(true));
        let record = self.base.service().create(owner, fields).await?;
        Ok(serde_json::to_value(record)?)
    }
}

#[async_trait]
impl CrudController for CatalogueController {
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
            other => self.base.handle(other, input).await,
        }
    }
}
