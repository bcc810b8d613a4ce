use async_trait::async_trait;
use query_value::QueryValue;
use thiserror::Error;

/// The backing-store contract leaves evaluate against. Entries are
/// [`QueryValue::Object`]s identified by their `id` property and grouped
/// into named collections.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list(&self, collection: &str) -> Result<Vec<QueryValue>, StoreError>;

    async fn get(&self, collection: &str, id: &QueryValue) -> Result<Option<QueryValue>, StoreError>;

    /// Inserts an entry, assigning an `id` if absent, and returns the stored
    /// entry.
    async fn insert(&self, collection: &str, entry: QueryValue) -> Result<QueryValue, StoreError>;

    /// Merges `changes` into the entry with the given id. Returns the updated
    /// entry, or `None` if no such entry exists.
    async fn update(
        &self,
        collection: &str,
        id: &QueryValue,
        changes: QueryValue,
    ) -> Result<Option<QueryValue>, StoreError>;

    /// Removes and returns the entry with the given id, or `None` if no such
    /// entry exists.
    async fn delete(&self, collection: &str, id: &QueryValue) -> Result<Option<QueryValue>, StoreError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("collection `{0}` does not exist")]
    UnknownCollection(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}
