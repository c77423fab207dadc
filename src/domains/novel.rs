//! The `novel` feature: the novel catalogue at `/novels`, its volumes at
//! `/novel-volumes` and their chapters at `/novel-chapters`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::library::{Catalogue, RoleSpec, Section, SerialStatus};
use crate::config::Configure;
use crate::module::FeatureDescriptor;
use crate::restful::dto::{default_limit, default_page, optional_scalar, scalar, TrashedFilter};
use crate::restful::shape;

pub const FEATURE: &str = "novel";
pub const SUBJECT: &str = "novel";
pub const VOLUME_SUBJECT: &str = "novel-volume";
pub const CHAPTER_SUBJECT: &str = "novel-chapter";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNovelDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub detail_url: Option<String>,
    #[serde(default)]
    pub status: SerialStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 10.0))]
    pub rating: Option<f64>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub latest_chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count_parsed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50))]
    pub feature_value: Option<String>,
    pub crawl_time: DateTime<Utc>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateNovelDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub detail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SerialStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 10.0))]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub latest_chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count_parsed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50))]
    pub feature_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryNovelDto {
    #[serde(default = "default_page", deserialize_with = "scalar")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "scalar")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    #[serde(default)]
    pub trashed: TrashedFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SerialStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVolumeDto {
    pub novel_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub volume_name: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateVolumeDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub volume_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryVolumeDto {
    #[serde(default = "default_page", deserialize_with = "scalar")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "scalar")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    #[serde(default)]
    pub trashed: TrashedFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub novel_id: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateChapterDto {
    pub volume_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub chapter_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub chapter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub content_crawled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<DateTime<Utc>>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateChapterDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub chapter_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub chapter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_crawled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryChapterDto {
    #[serde(default = "default_page", deserialize_with = "scalar")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "scalar")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    #[serde(default)]
    pub trashed: TrashedFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub novel_id: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_crawled: Option<bool>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled: Option<bool>,
}

fn enabled_by_default() -> bool {
    true
}

pub fn catalogue() -> Catalogue {
    Catalogue {
        feature: FEATURE,
        subject: SUBJECT,
        path: "/novels",
        search_fields: &["name", "author", "themes", "tags", "feature_value"],
        filters: &["author", "status", "themes", "tags", "enabled"],
        ranges: &[],
        editor: RoleSpec {
            name: "novel-editor",
            label: "Novel editor",
            description: "Adds and edits novels",
        },
        manager: RoleSpec {
            name: "novel-manager",
            label: "Novel manager",
            description: "Manages the whole novel catalogue",
        },
        list: shape::<QueryNovelDto>(),
        store: shape::<CreateNovelDto>(),
        update: shape::<UpdateNovelDto>(),
        sections: vec![
            Section {
                subject: VOLUME_SUBJECT,
                path: "/novel-volumes",
                parent: SUBJECT,
                parent_key: "novel_id",
                inherit: &[],
                count_field: None,
                order_key: "sort_order",
                filters: &["novel_id", "enabled"],
                list: shape::<QueryVolumeDto>(),
                store: shape::<CreateVolumeDto>(),
                update: shape::<UpdateVolumeDto>(),
            },
            Section {
                subject: CHAPTER_SUBJECT,
                path: "/novel-chapters",
                parent: VOLUME_SUBJECT,
                parent_key: "volume_id",
                inherit: &["novel_id"],
                count_field: None,
                order_key: "sort_order",
                filters: &["volume_id", "novel_id", "content_crawled", "enabled"],
                list: shape::<QueryChapterDto>(),
                store: shape::<CreateChapterDto>(),
                update: shape::<UpdateChapterDto>(),
            },
        ],
    }
}

pub async fn build(configure: Arc<Configure>, params: Value) -> anyhow::Result<FeatureDescriptor> {
    catalogue().build(&configure, &params)
}
