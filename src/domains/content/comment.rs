//! Comments at `/comments`. Anyone signed in may comment on a post they can
//! see; authors may delete their own comments.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::dto::{CreateCommentDto, QueryCommentDto};
use crate::domain::{ListScope, RecordService, Visibility};
use crate::error::{AppError, Result};
use crate::rbac::{Checker, PermissionAction};
use crate::restful::dto::{ListQuery, TrashedFilter};
use crate::restful::{
    shape, ActionOption, BaseController, CrudAction, CrudController, RouteInput, RouteManifest,
};

pub const SUBJECT: &str = "comment";

pub struct CommentController {
    base: BaseController,
    posts: Arc<RecordService>,
}

impl CommentController {
    pub fn new(service: Arc<RecordService>, posts: Arc<RecordService>) -> Self {
        Self {
            base: BaseController::new(SUBJECT, "/comments", service),
            posts,
        }
    }

    async fn list(&self, input: &RouteInput) -> Result<Value> {
        let query: QueryCommentDto = input.decode()?;
        if let Some(post) = query.post {
            self.posts
                .detail(post, TrashedFilter::None, Visibility::published(input.requester_id()))
                .await?;
        }
        let list = ListQuery {
            page: query.page,
            limit: query.limit,
            ..ListQuery::default()
        };
        let scope = ListScope::default().field("post", query.post.map(|id| json!(id)));
        let page = self
            .base
            .service()
            .paginate_scoped(&list, Visibility::all(), scope)
            .await?;
        Ok(serde_json::to_value(page)?)
    }

    async fn store(&self, input: &RouteInput) -> Result<Value> {
        let owner = input
            .requester_id()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        let dto: CreateCommentDto = input.decode()?;

        self.posts
            .detail(dto.post, TrashedFilter::None, Visibility::published(Some(owner)))
            .await
            .map_err(|_| AppError::Validation(format!("post {} does not exist", dto.post)))?;

        if let Some(parent) = dto.parent {
            let parent = self
                .base
                .service()
                .detail(parent, TrashedFilter::None, Visibility::all())
                .await
                .map_err(|_| AppError::Validation(format!("parent comment {} does not exist", parent)))?;
            if parent.data.get("post") != Some(&json!(dto.post)) {
                return Err(AppError::Validation(
                    "parent comment belongs to another post".to_string(),
                ));
            }
        }

        let mut fields = input.fields()?;
        fields.insert("publish".to_string(), Value::Bool(true));
        let record = self.base.service().create(owner, fields).await?;
        Ok(serde_json::to_value(record)?)
    }
}

#[async_trait]
impl CrudController for CommentController {
    fn resource(&self) -> &str {
        self.base.resource()
    }

    fn path(&self) -> &str {
        self.base.path()
    }

    fn templates(&self) -> &[CrudAction] {
        &[
            CrudAction::List,
            CrudAction::Detail,
            CrudAction::Store,
            CrudAction::Delete,
        ]
    }

    async fn handle(&self, action: CrudAction, input: RouteInput) -> Result<Value> {
        match action {
            CrudAction::List => self.list(&input).await,
            CrudAction::Store => self.store(&input).await,
            other => self.base.handle(other, input).await,
        }
    }
}

pub fn manifest() -> RouteManifest {
    RouteManifest::new(SUBJECT)
        .action("list", ActionOption::new().describe("List comments").guest())
        .action("detail", ActionOption::new().describe("Show a comment").guest())
        .action(
            "store",
            ActionOption::new()
                .describe("Comment on a post")
                .checker(Checker::can(PermissionAction::Create, SUBJECT)),
        )
        .action(
            "delete",
            ActionOption::new()
                .describe("Delete comments (author only)")
                .checker(Checker::can(PermissionAction::Delete, SUBJECT))
                .checker(Checker::owner(SUBJECT)),
        )
        .list_shape(shape::<QueryCommentDto>())
        .store_shape(shape::<CreateCommentDto>())
}
