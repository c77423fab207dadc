//! Input shapes of the content resources

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::restful::dto::{
    default_limit, default_page, optional_scalar, scalar, ListQuery, TrashedFilter,
};

lazy_static::lazy_static! {
    pub static ref SLUG_REGEX: regex::Regex = regex::Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if SLUG_REGEX.is_match(slug) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_slug"))
    }
}

/// Markup of a post body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostBodyType {
    Html,
    Markdown,
}

/// Post listing. The trash is never listed publicly.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryPostDto {
    #[serde(default = "default_page", deserialize_with = "scalar")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "scalar")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_published: Option<bool>,
}

impl QueryPostDto {
    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            limit: self.limit,
            trashed: TrashedFilter::None,
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostFields {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_slug"), length(max = 255))]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
    /// Ordering on the author's own post list
    #[serde(default)]
    pub user_order: u32,
}

/// Post creation when the deployment accepts both body types.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostDto {
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: PostFields,
    #[serde(rename = "type", default = "default_body_type")]
    pub body_type: PostBodyType,
}

fn default_body_type() -> PostBodyType {
    PostBodyType::Markdown
}

/// Post creation when the body type is fixed by configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostWithoutTypeDto {
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: PostFields,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePostFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_slug"), length(max = 255))]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePostDto {
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: UpdatePostFields,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<PostBodyType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePostWithoutTypeDto {
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: UpdatePostFields,
}

/// Category listing has no trash filter.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryCategoryDto {
    #[serde(default = "default_page", deserialize_with = "scalar")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "scalar")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 25))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Uuid>,
    #[serde(default)]
    pub custom_order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 25))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryCommentDto {
    #[serde(default = "default_page", deserialize_with = "scalar")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "scalar")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentDto {
    #[validate(length(min = 1, max = 1000))]
    pub body: String,
    pub post: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Uuid>,
}
