//! Domain layer: stored records and the services around them

pub mod lookup;
pub mod record;
pub mod search;
pub mod service;
pub mod store;

pub use lookup::{StoreOwnerLookup, SubjectStore};
pub use record::Record;
pub use search::SearchIndex;
pub use service::{ListScope, RecordService, Visibility};
pub use store::{FieldRange, MemoryRecordStore, RecordFilter, RecordStore};
