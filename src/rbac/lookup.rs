//! Owner lookup consumed by ownership checks.

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OwnerLookup: Send + Sync {
    /// Owner id per record. Ids with no record are absent from the map.
    async fn fetch_owners_by_ids(&self, subject: &str, ids: &[Uuid]) -> Result<HashMap<Uuid, Uuid>>;
}
