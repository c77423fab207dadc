//! Controllers handle the actions a route table dispatches to them.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::action::CrudAction;
use super::dto::{DeleteDto, DetailQuery, ListQuery, RestoreDto};
use crate::domain::{RecordService, Visibility};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;

/// Validated input of one request.
#[derive(Debug, Clone)]
pub struct RouteInput {
    pub requester: Option<AuthUser>,
    pub item: Option<Uuid>,
    pub input: Value,
}

impl RouteInput {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.input.clone()).map_err(|e| AppError::Validation(e.to_string()))
    }

    pub fn item(&self) -> Result<Uuid> {
        self.item
            .ok_or_else(|| AppError::BadRequest("missing item id".to_string()))
    }

    pub fn requester_id(&self) -> Option<Uuid> {
        self.requester.as_ref().map(|u| u.user_id)
    }

    /// The input as an object map.
    pub fn fields(&self) -> Result<Map<String, Value>> {
        match &self.input {
            Value::Object(map) => Ok(map.clone()),
            _ => Err(AppError::Validation("expected a JSON object".to_string())),
        }
    }
}

#[async_trait]
pub trait CrudController: Send + Sync {
    /// Resource id the controller serves, e.g. `post`
    fn resource(&self) -> &str;

    /// Path below the API prefix, e.g. `/posts`
    fn path(&self) -> &str;

    /// Templates this controller can handle
    fn templates(&self) -> &[CrudAction] {
        &CrudAction::ALL
    }

    async fn handle(&self, action: CrudAction, input: RouteInput) -> Result<Value>;
}

/// Standard handlers backed by a [`RecordService`].
pub struct BaseController {
    resource: String,
    path: String,
    service: Arc<RecordService>,
}

impl BaseController {
    pub fn new(resource: impl Into<String>, path: impl Into<String>, service: Arc<RecordService>) -> Self {
        Self {
            resource: resource.into(),
            path: path.into(),
            service,
        }
    }

    pub fn service(&self) -> &Arc<RecordService> {
        &self.service
    }

    pub async fn list(&self, input: &RouteInput, visibility: Visibility) -> Result<Value> {
        let query: ListQuery = input.decode()?;
        let page = self.service.paginate(&query, visibility).await?;
        Ok(serde_json::to_value(page)?)
    }

    pub async fn detail(&self, input: &RouteInput, visibility: Visibility) -> Result<Value> {
        let query: DetailQuery = input.decode()?;
        let record = self
            .service
            .detail(input.item()?, query.trashed, visibility)
            .await?;
        Ok(serde_json::to_value(record)?)
    }

    pub async fn store(&self, input: &RouteInput) -> Result<Value> {
        let owner = input
            .requester_id()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        let record = self.service.create(owner, input.fields()?).await?;
        Ok(serde_json::to_value(record)?)
    }

    pub async fn update(&self, input: &RouteInput) -> Result<Value> {
        let record = self.service.update(input.item()?, input.fields()?).await?;
        Ok(serde_json::to_value(record)?)
    }

    pub async fn delete(&self, input: &RouteInput) -> Result<Value> {
        let dto: DeleteDto = input.decode()?;
        let records = self
            .service
            .delete(&dto.items, dto.trash.unwrap_or(true))
            .await?;
        Ok(serde_json::to_value(records)?)
    }

    pub async fn restore(&self, input: &RouteInput) -> Result<Value> {
        let dto: RestoreDto = input.decode()?;
        let records = self.service.restore(&dto.items).await?;
        Ok(serde_json::to_value(records)?)
    }
}

#[async_trait]
impl CrudController for BaseController {
    fn resource(&self) -> &str {
        &self.resource
    }

    fn path(&self) -> &str {
        &self.path
    }

    async fn handle(&self, action: CrudAction, input: RouteInput) -> Result<Value> {
        match action {
            CrudAction::List => self.list(&input, Visibility::all()).await,
            CrudAction::Detail => self.detail(&input, Visibility::all()).await,
            CrudAction::Store => self.store(&input).await,
            CrudAction::Update => self.update(&input).await,
            CrudAction::Delete => self.delete(&input).await,
            CrudAction::Restore => self.restore(&input).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MemoryRecordStore;
    use serde_json::json;

    fn controller() -> BaseController {
        let service = RecordService::new("category", Arc::new(MemoryRecordStore::new()));
        BaseController::new("category", "/categories", Arc::new(service))
    }

    fn input(requester: Option<AuthUser>, item: Option<Uuid>, input: Value) -> RouteInput {
        RouteInput {
            requester,
            item,
            input,
        }
    }

    fn admin() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            roles: vec!["super-admin".to_string()],
        }
    }

    #[tokio::test]
    async fn test_store_then_detail() {
        let controller = controller();
        let created = controller
            .handle(
                CrudAction::Store,
                input(Some(admin()), None, json!({"name": "Rust"})),
            )
            .await
            .unwrap();
        let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

        let found = controller
            .handle(CrudAction::Detail, input(None, Some(id), json!({})))
            .await
            .unwrap();
        assert_eq!(found["name"], json!("Rust"));
    }

    #[tokio::test]
    async fn test_store_without_requester() {
        let result = controller()
            .handle(CrudAction::Store, input(None, None, json!({"name": "x"})))
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_list_delete_restore() {
        let controller = controller();
        let user = admin();
        let created = controller
            .handle(CrudAction::Store, input(Some(user.clone()), None, json!({"name": "a"})))
            .await
            .unwrap();
        let id = created["id"].clone();

        controller
            .handle(CrudAction::Delete, input(Some(user.clone()), None, json!({"items": [id]})))
            .await
            .unwrap();
        let live = controller
            .handle(CrudAction::List, input(None, None, json!({})))
            .await
            .unwrap();
        assert_eq!(live["pagination"]["total"], json!(0));

        let trashed = controller
            .handle(CrudAction::List, input(None, None, json!({"trashed": "only"})))
            .await
            .unwrap();
        assert_eq!(trashed["pagination"]["total"], json!(1));

        let restored = controller
            .handle(CrudAction::Restore, input(Some(user), None, json!({"items": [id]})))
            .await
            .unwrap();
        assert_eq!(restored.as_array().unwrap().len(), 1);
    }
}
