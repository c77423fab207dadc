//! Stored entity shared by every content subject

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One record of some subject (`post`, `manga`, ...). Subject-specific
/// fields live in `data` and are flattened into the JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(flatten)]
    pub data: Map<String, Value>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set while the record sits in the trash
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn new(owner_id: Uuid, data: Map<String, Value>) -> Self {
        Self::with_id(Uuid::new_v4(), owner_id, data)
    }

    pub fn with_id(id: Uuid, owner_id: Uuid, data: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id,
            data,
            published_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some_and(|at| at <= Utc::now())
    }

    /// Whether `viewer` may see this record on a published-only listing.
    pub fn visible_to(&self, viewer: Option<Uuid>) -> bool {
        self.is_published() || viewer == Some(self.owner_id)
    }
}
