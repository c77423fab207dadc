//! The `manga` feature: the manga catalogue at `/mangas`, its chapters at
//! `/manga-chapters` and chapter images at `/manga-images`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::library::{Catalogue, RangeFilter, RoleSpec, Section, SerialStatus};
use crate::config::Configure;
use crate::module::FeatureDescriptor;
use crate::restful::dto::{default_limit, default_page, optional_scalar, scalar, TrashedFilter};
use crate::restful::shape;

pub const FEATURE: &str = "manga";
pub const SUBJECT: &str = "manga";
pub const CHAPTER_SUBJECT: &str = "manga-chapter";
pub const IMAGE_SUBJECT: &str = "manga-image";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMangaDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub author: Option<String>,
    #[serde(default)]
    pub total_chapters: u32,
    #[serde(default)]
    pub status: SerialStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub generated_time: DateTime<Utc>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMangaDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chapters: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SerialStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryMangaDto {
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
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled: Option<bool>,
    /// Lower bound on `total_chapters`
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_chapters: Option<u32>,
    /// Upper bound on `total_chapters`
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_chapters: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateChapterDto {
    pub manga_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub chapter_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub chapter_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub image_count: u32,
    #[serde(default)]
    pub images_crawled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<DateTime<Utc>>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateChapterDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub chapter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub chapter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_crawled: Option<bool>,
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
    pub manga_id: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub images_crawled: Option<bool>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateImageDto {
    pub chapter_id: Uuid,
    #[validate(url, length(max = 500))]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub local_path: Option<String>,
    #[serde(default)]
    pub image_order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 10))]
    pub format: Option<String>,
    #[serde(default)]
    pub downloaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_time: Option<DateTime<Utc>>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateImageDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url, length(max = 500))]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 10))]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloaded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryImageDto {
    #[serde(default = "default_page", deserialize_with = "scalar")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "scalar")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    #[serde(default)]
    pub trashed: TrashedFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manga_id: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub downloaded: Option<bool>,
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
        path: "/mangas",
        search_fields: &["title", "author", "tags", "categories", "description"],
        filters: &["author", "status", "tags", "categories", "enabled"],
        ranges: &[RangeFilter {
            field: "total_chapters",
            min: "min_chapters",
            max: "max_chapters",
        }],
        editor: RoleSpec {
            name: "manga-editor",
            label: "Manga editor",
            description: "Adds and edits mangas",
        },
        manager: RoleSpec {
            name: "manga-manager",
            label: "Manga manager",
            description: "Manages the whole manga catalogue",
        },
        list: shape::<QueryMangaDto>(),
        store: shape::<CreateMangaDto>(),
        update: shape::<UpdateMangaDto>(),
        sections: vec![
            Section {
                subject: CHAPTER_SUBJECT,
                path: "/manga-chapters",
                parent: SUBJECT,
                parent_key: "manga_id",
                inherit: &[],
                count_field: Some("total_chapters"),
                order_key: "sort_order",
                filters: &["manga_id", "images_crawled", "enabled"],
                list: shape::<QueryChapterDto>(),
                store: shape::<CreateChapterDto>(),
                update: shape::<UpdateChapterDto>(),
            },
            Section {
                subject: IMAGE_SUBJECT,
                path: "/manga-images",
                parent: CHAPTER_SUBJECT,
                parent_key: "chapter_id",
                inherit: &["manga_id"],
                count_field: Some("image_count"),
                order_key: "image_order",
                filters: &["chapter_id", "manga_id", "downloaded", "enabled"],
                list: shape::<QueryImageDto>(),
                store: shape::<CreateImageDto>(),
                update: shape::<UpdateImageDto>(),
            },
        ],
    }
}

pub async fn build(configure: Arc<Configure>, params: Value) -> anyhow::Result<FeatureDescriptor> {
    catalogue().build(&configure, &params)
}
