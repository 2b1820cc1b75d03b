use crate::store::watch::Watch;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("no record at {0}")]
    NotFound(String),

    #[error("precondition failed at {0}")]
    PreconditionFailed(String),
}

/// Guard evaluated atomically with a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    None,
    /// The named field must not be present on the record yet.
    FieldAbsent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchTarget {
    /// Whole-record snapshots of the record at this path, starting with the current one.
    Record(String),
    /// Entries appended to the collection after the watch is registered.
    Additions(String),
    /// Entries already in the collection followed by every later append.
    AdditionsWithBacklog(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Allocates an empty record in `collection` and returns its id.
    async fn create_record(&self, collection: &str) -> Result<String, StoreError>;

    /// `Ok(None)` when there is no record at `path`.
    async fn get_record(&self, path: &str) -> Result<Option<Fields>, StoreError>;

    /// Full overwrite.
    async fn set_fields(&self, path: &str, fields: Fields) -> Result<(), StoreError>;

    /// Partial merge into an existing record.
    async fn update_fields(
        &self,
        path: &str,
        fields: Fields,
        precondition: Precondition,
    ) -> Result<(), StoreError>;

    /// Appends an entry to a subcollection and returns the entry id.
    async fn append(&self, collection: &str, entry: Value) -> Result<String, StoreError>;

    async fn subscribe(&self, target: WatchTarget) -> Result<Watch, StoreError>;
}

pub fn record_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, id)
}
