use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::filter::{FilterPredicate, SortSpec};

/// A stored document: a JSON object whose identity lives in `_id`.
pub type Document = Map<String, Value>;

/// Shared handle to the process-wide store.
pub type StoreHandle = Arc<dyn DocumentStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Grouped count (and optional sum) over the documents matching a predicate.
#[derive(Debug, Clone, Copy)]
pub struct Aggregation<'a> {
    pub group_field: &'a str,
    pub sum_field: Option<&'a str>,
    /// Only documents whose field equals the value contribute to the sum.
    pub sum_when: Option<(&'a str, &'a str)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBucket {
    pub key: Option<String>,
    pub count: u64,
    pub sum: Decimal,
}

/// Partial update applied to one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    /// Top-level fields overwritten on the document.
    pub set: Document,
    /// Value appended to an array field (created when missing).
    pub push: Option<(String, Value)>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn count(&self, collection: &str, predicate: &FilterPredicate) -> Result<u64, StoreError>;

    /// Sorted, offset-bounded fetch. Ties on the sort field are ordered by id.
    async fn find(
        &self,
        collection: &str,
        predicate: &FilterPredicate,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>, StoreError>;

    async fn aggregate(
        &self,
        collection: &str,
        predicate: &FilterPredicate,
        aggregation: &Aggregation<'_>,
    ) -> Result<Vec<GroupBucket>, StoreError>;

    /// Fetch a live (not soft-deleted) document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Returns the updated document, or `None` when no live document has that id.
    async fn update(&self, collection: &str, id: &str, patch: DocumentPatch) -> Result<Option<Document>, StoreError>;

    /// Insert a document, generating an `_id` when it has none. Duplicate ids conflict.
    async fn insert(&self, collection: &str, doc: Document) -> Result<String, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Identity of a document in its single string form.
///
/// Accepts `_id` or `id` as a string, a number, or an extended-JSON `{"$oid": ..}`.
pub fn document_id(doc: &Document) -> Option<String> {
    doc.get("_id").or_else(|| doc.get("id")).and_then(id_string)
}

pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => obj.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Inner string of an extended-JSON wrapper: `{"$oid": ..}` or `{"$date": ..}`.
pub fn extended_string(value: &Value) -> Option<&str> {
    let obj = value.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    match (obj.get("$oid"), obj.get("$date")) {
        (Some(Value::String(s)), _) | (_, Some(Value::String(s))) => Some(s),
        _ => None,
    }
}

/// Field value with extended-JSON wrappers collapsed, the form clients see.
pub fn plain_value(value: &Value) -> Value {
    match extended_string(value) {
        Some(s) => Value::String(s.to_string()),
        None => value.clone(),
    }
}

pub fn is_soft_deleted(doc: &Document) -> bool {
    matches!(doc.get("isDeleted"), Some(Value::Bool(true)))
}
