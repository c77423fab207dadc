//! The `user` feature: accounts at `/users`.
//!
//! Signing up is open to guests and the new account owns itself, so the
//! ownership checker lets a user read and edit their own record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::config::Configure;
use crate::domain::{MemoryRecordStore, RecordService, RecordStore, SubjectStore};
use crate::error::Result;
use crate::module::{FeatureDescriptor, Provider};
use crate::rbac::{Checker, PermissionAction, RbacContribution};
use crate::restful::{
    manifest_factory, shape, ActionOption, BaseController, CrudAction, CrudController,
    RestfulResource, RouteInput, RouteManifest,
};

pub const FEATURE: &str = "user";
pub const SUBJECT: &str = "user";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpDto {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub nickname: Option<String>,
}

pub struct UserController {
    base: BaseController,
}

impl UserController {
    pub fn new(service: Arc<RecordService>) -> Self {
        Self {
            base: BaseController::new(SUBJECT, "/users", service),
        }
    }

    async fn sign_up(&self, input: &RouteInput) -> Result<Value> {
        let dto: SignUpDto = input.decode()?;
        tracing::debug!(username = %dto.username, "Signing up");
        let id = Uuid::new_v4();
        let record = self
            .base
            .service()
            .create_unique(id, id, input.fields()?, "username")
            .await?;
        Ok(serde_json::to_value(record)?)
    }
}

#[async_trait]
impl CrudController for UserController {
    fn resource(&self) -> &str {
        self.base.resource()
    }

    fn path(&self) -> &str {
        self.base.path()
    }

    async fn handle(&self, action: CrudAction, input: RouteInput) -> Result<Value> {
        match action {
            CrudAction::Store => self.sign_up(&input).await,
            other => self.base.handle(other, input).await,
        }
    }
}

fn manifest() -> RouteManifest {
    let manage = Checker::can(PermissionAction::Manage, SUBJECT);
    RouteManifest::new(SUBJECT)
        .action(
            "list",
            ActionOption::new().describe("List users").checker(manage.clone()),
        )
        .action(
            "detail",
            ActionOption::new()
                .describe("Show a user")
                .checker(Checker::can(PermissionAction::Read, SUBJECT))
                .checker(Checker::owner(SUBJECT)),
        )
        .action("store", ActionOption::new().describe("Sign up").guest())
        .action(
            "update",
            ActionOption::new()
                .describe("Update a user")
                .checker(Checker::can(PermissionAction::Update, SUBJECT))
                .checker(Checker::owner(SUBJECT)),
        )
        .action(
            "delete",
            ActionOption::new().describe("Delete users").checker(manage.clone()),
        )
        .action(
            "restore",
            ActionOption::new().describe("Restore users").checker(manage),
        )
        .store_shape(shape::<SignUpDto>())
        .update_shape(shape::<UpdateUserDto>())
}

pub async fn build(_configure: Arc<Configure>, _params: Value) -> anyhow::Result<FeatureDescriptor> {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let service = Arc::new(RecordService::new(SUBJECT, store.clone()));
    let controller = Arc::new(UserController::new(service.clone()));

    Ok(FeatureDescriptor::new()
        .import(super::rbac::FEATURE)
        .provide_exported(Provider::shared("user.service", service))
        .provide(Provider::value("user.store", SubjectStore::new(SUBJECT, store)))
        .provide(Provider::value(
            "user.rbac",
            RbacContribution::crud(SUBJECT),
        ))
        .provide(Provider::value(
            "user.restful",
            RestfulResource::new(controller, manifest_factory(|_| async { Ok(manifest()) })),
        )))
}
