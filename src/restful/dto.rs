//! Shared request and response types for derived CRUD routes

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Which soft-deleted records a query includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrashedFilter {
    /// Only live records
    #[default]
    None,
    /// Only soft-deleted records
    Only,
    All,
}

/// Query for list routes
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page", deserialize_with = "scalar")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "scalar")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    #[serde(default)]
    pub trashed: TrashedFilter,
    /// Free-text search, honoured when a search index is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

pub(crate) fn default_page() -> u32 {
    1
}

pub(crate) fn default_limit() -> u32 {
    20
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            trashed: TrashedFilter::None,
            search: None,
        }
    }
}

/// Query for detail routes
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct DetailQuery {
    #[serde(default)]
    pub trashed: TrashedFilter,
}

/// Body of delete routes
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DeleteDto {
    #[validate(length(min = 1))]
    pub items: Vec<Uuid>,
    /// Soft delete when true (default); `false` removes the records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trash: Option<bool>,
}

/// Body of restore routes
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RestoreDto {
    #[validate(length(min = 1))]
    pub items: Vec<Uuid>,
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1)));
        Self {
            data,
            pagination: PaginationMeta {
                page,
                limit,
                total,
                total_pages,
            },
        }
    }
}

/// Raw query pairs as a JSON object of strings. Typed fields of the list
/// shape read their value back with [`scalar`] or [`optional_scalar`].
pub fn query_object(pairs: HashMap<String, String>) -> Value {
    Value::Object(
        pairs
            .into_iter()
            .map(|(key, raw)| (key, Value::String(raw)))
            .collect::<Map<String, Value>>(),
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar<T> {
    Native(T),
    Text(String),
}

impl<T> Scalar<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn into_value<E: de::Error>(self) -> std::result::Result<T, E> {
        match self {
            Scalar::Native(value) => Ok(value),
            Scalar::Text(text) => text.parse().map_err(E::custom),
        }
    }
}

/// Deserialize a number or boolean from either its JSON form or its text,
/// as it arrives in a query string.
pub fn scalar<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    Scalar::<T>::deserialize(deserializer)?.into_value()
}

pub fn optional_scalar<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    Option::<Scalar<T>>::deserialize(deserializer)?
        .map(Scalar::into_value)
        .transpose()
}
