//! Posts at `/posts`.
//!
//! Listing and reading are open to guests; unpublished posts stay visible to
//! their author only.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::dto::{
    CreatePostDto, CreatePostWithoutTypeDto, PostBodyType, QueryPostDto, UpdatePostDto,
    UpdatePostWithoutTypeDto,
};
use super::sanitize::HtmlSanitizer;
use crate::config::PostTypeOption;
use crate::domain::{ListScope, RecordService, Visibility};
use crate::error::{AppError, Result};
use crate::rbac::{Checker, PermissionAction};
use crate::restful::dto::TrashedFilter;
use crate::restful::{
    shape, ActionOption, BaseController, CrudAction, CrudController, RouteInput, RouteManifest,
};

pub const SUBJECT: &str = "post";

pub struct PostController {
    base: BaseController,
    categories: Arc<RecordService>,
    post_type: PostTypeOption,
    sanitizer: Option<Arc<HtmlSanitizer>>,
}

impl PostController {
    pub fn new(
        service: Arc<RecordService>,
        categories: Arc<RecordService>,
        post_type: PostTypeOption,
        sanitizer: Option<Arc<HtmlSanitizer>>,
    ) -> Self {
        Self {
            base: BaseController::new(SUBJECT, "/posts", service),
            categories,
            post_type,
            sanitizer,
        }
    }

    async fn list(&self, input: &RouteInput) -> Result<Value> {
        let query: QueryPostDto = input.decode()?;
        let scope = ListScope::default()
            .owner(query.author)
            .published(query.is_published)
            .field("category", query.category.map(|id| json!(id)));
        let page = self
            .base
            .service()
            .paginate_scoped(
                &query.list_query(),
                Visibility::published(input.requester_id()),
                scope,
            )
            .await?;
        Ok(serde_json::to_value(page)?)
    }

    async fn detail(&self, input: &RouteInput) -> Result<Value> {
        let record = self
            .base
            .service()
            .detail(
                input.item()?,
                TrashedFilter::None,
                Visibility::published(input.requester_id()),
            )
            .await?;
        Ok(serde_json::to_value(record)?)
    }

    async fn store(&self, input: &RouteInput) -> Result<Value> {
        let owner = input
            .requester_id()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        let mut fields = input.fields()?;
        self.prepare(&mut fields, None).await?;
        let record = self.base.service().create(owner, fields).await?;
        Ok(serde_json::to_value(record)?)
    }

    async fn update(&self, input: &RouteInput) -> Result<Value> {
        let id = input.item()?;
        let current = self
            .base
            .service()
            .detail(id, TrashedFilter::None, Visibility::all())
            .await?;
        let mut fields = input.fields()?;
        self.prepare(&mut fields, current.data.get("type")).await?;
        let record = self.base.service().update(id, fields).await?;
        Ok(serde_json::to_value(record)?)
    }

    /// Fix the body type, check the category and clean HTML bodies.
    async fn prepare(&self, fields: &mut Map<String, Value>, stored: Option<&Value>) -> Result<()> {
        let body_type = match self.post_type {
            PostTypeOption::Markdown => PostBodyType::Markdown,
            PostTypeOption::Html => PostBodyType::Html,
            PostTypeOption::All => fields
                .get("type")
                .or(stored)
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or(PostBodyType::Markdown),
        };
        fields.insert("type".to_string(), serde_json::to_value(body_type)?);

        if let Some(category) = fields.get("category").and_then(Value::as_str) {
            let id = uuid::Uuid::parse_str(category)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            self.categories
                .detail(id, TrashedFilter::None, Visibility::all())
                .await
                .map_err(|_| AppError::Validation(format!("category {} does not exist", id)))?;
        }

        if body_type == PostBodyType::Html {
            if let (Some(sanitizer), Some(Value::String(body))) =
                (&self.sanitizer, fields.get_mut("body"))
            {
                *body = sanitizer.sanitize(body);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CrudController for PostController {
    fn resource(&self) -> &str {
        self.base.resource()
    }

    fn path(&self) -> &str {
        self.base.path()
    }

    async fn handle(&self, action: CrudAction, input: RouteInput) -> Result<Value> {
        match action {
            CrudAction::List => self.list(&input).await,
            CrudAction::Detail => self.detail(&input).await,
            CrudAction::Store => self.store(&input).await,
            CrudAction::Update => self.update(&input).await,
            other => self.base.handle(other, input).await,
        }
    }
}

/// Post routes; the accepted body shapes follow `content.post_type`.
pub fn manifest(post_type: PostTypeOption) -> RouteManifest {
    let owner_or = |action| {
        ActionOption::new()
            .checker(Checker::can(action, SUBJECT))
            .checker(Checker::owner(SUBJECT))
    };

    let manifest = RouteManifest::new(SUBJECT)
        .action("list", ActionOption::new().describe("List published posts").guest())
        .action("detail", ActionOption::new().describe("Show a post").guest())
        .action(
            "store",
            ActionOption::new()
                .describe("Write a post")
                .checker(Checker::can(PermissionAction::Create, SUBJECT)),
        )
        .action(
            "update",
            owner_or(PermissionAction::Update).describe("Edit a post (author only)"),
        )
        .action(
            "delete",
            owner_or(PermissionAction::Delete).describe("Delete posts (author only)"),
        )
        .list_shape(shape::<QueryPostDto>());

    match post_type {
        PostTypeOption::All => manifest
            .store_shape(shape::<CreatePostDto>())
            .update_shape(shape::<UpdatePostDto>()),
        _ => manifest
            .store_shape(shape::<CreatePostWithoutTypeDto>())
            .update_shape(shape::<UpdatePostWithoutTypeDto>()),
    }
}
