//! In-process document store. Used when no `DATABASE_URL` is configured and by
//! the test suite; evaluates predicates directly instead of rendering SQL.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tokio::sync::RwLock;

use super::store::{
    document_id, extended_string, is_soft_deleted, plain_value, Aggregation, Document, DocumentPatch, DocumentStore,
    GroupBucket, StoreError,
};
use crate::filter::{Condition, FilterPredicate, SortDirection, SortSpec};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live<'a>(docs: &'a [Document], predicate: &'a FilterPredicate) -> impl Iterator<Item = &'a Document> + 'a {
        docs.iter().filter(move |doc| matches(doc, predicate))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn count(&self, collection: &str, predicate: &FilterPredicate) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        let docs = collections.get(collection).map(Vec::as_slice).unwrap_or_default();
        Ok(Self::live(docs, predicate).count() as u64)
    }

    async fn find(
        &self,
        collection: &str,
        predicate: &FilterPredicate,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let docs = collections.get(collection).map(Vec::as_slice).unwrap_or_default();

        let mut matched: Vec<&Document> = Self::live(docs, predicate).collect();
        matched.sort_by(|a, b| compare_docs(a, b, sort));

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn aggregate(
        &self,
        collection: &str,
        predicate: &FilterPredicate,
        aggregation: &Aggregation<'_>,
    ) -> Result<Vec<GroupBucket>, StoreError> {
        let collections = self.collections.read().await;
        let docs = collections.get(collection).map(Vec::as_slice).unwrap_or_default();

        let mut groups: BTreeMap<Option<String>, (u64, Decimal)> = BTreeMap::new();
        for doc in Self::live(docs, predicate) {
            let entry = groups.entry(field_text(doc, aggregation.group_field)).or_default();
            entry.0 += 1;
            if let Some(sum_field) = aggregation.sum_field {
                let counts = aggregation
                    .sum_when
                    .map_or(true, |(field, value)| field_text(doc, field).as_deref() == Some(value));
                if counts {
                    entry.1 += number_of(doc.get(sum_field)).unwrap_or_default();
                }
            }
        }

        Ok(groups
            .into_iter()
            .map(|(key, (count, sum))| GroupBucket { key, count, sum })
            .collect())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| !is_soft_deleted(d) && document_id(d).as_deref() == Some(id)))
            .cloned())
    }

    async fn update(&self, collection: &str, id: &str, patch: DocumentPatch) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| !is_soft_deleted(d) && document_id(d).as_deref() == Some(id)))
        else {
            return Ok(None);
        };

        for (key, value) in patch.set {
            doc.insert(key, value);
        }
        if let Some((field, value)) = patch.push {
            match doc.get_mut(&field) {
                Some(Value::Array(items)) => items.push(value),
                _ => {
                    doc.insert(field, Value::Array(vec![value]));
                }
            }
        }
        Ok(Some(doc.clone()))
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        let id = match document_id(&doc) {
            Some(id) => id,
            None => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                doc.insert("_id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| document_id(d).as_deref() == Some(id.as_str())) {
            return Err(StoreError::Conflict(format!("{collection}/{id} already exists")));
        }
        docs.push(doc);
        Ok(id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn matches(doc: &Document, predicate: &FilterPredicate) -> bool {
    if !predicate.include_deleted && is_soft_deleted(doc) {
        return false;
    }
    predicate.conditions.iter().all(|condition| match condition {
        Condition::Eq { field, value } => field_text(doc, field).as_deref() == Some(value.as_str()),
        Condition::ContainsAny { fields, joined, needle } => {
            let needle = needle.to_lowercase();
            let joined = joined.iter().map(|group| joined_text(doc, group));
            fields
                .iter()
                .filter_map(|f| field_text(doc, f))
                .chain(joined)
                .any(|text| text.to_lowercase().contains(&needle))
        }
    })
}

/// Text form of a scalar field, the same form Postgres' `->>` yields.
/// Extended-JSON wrappers compare as their inner string.
fn field_text(doc: &Document, field: &str) -> Option<String> {
    let value = doc.get(field)?;
    if let Some(s) = extended_string(value) {
        return Some(s.to_string());
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Present fields of the group joined by one space, like `concat_ws(' ', ..)`.
fn joined_text(doc: &Document, fields: &[String]) -> String {
    fields
        .iter()
        .filter_map(|f| field_text(doc, f))
        .collect::<Vec<_>>()
        .join(" ")
}

fn number_of(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        _ => None,
    }
}

/// Missing fields sort last in both directions; ties fall back to id ascending.
fn compare_docs(a: &Document, b: &Document, sort: &SortSpec) -> Ordering {
    let primary = match (a.get(&sort.field), b.get(&sort.field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = compare_values(&plain_value(x), &plain_value(y));
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    };
    primary.then_with(|| document_id(a).cmp(&document_id(b)))
}

/// Cross-type order follows jsonb: null < string < number < bool < array < object.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::String(_) => 1,
            Value::Number(_) => 2,
            Value::Bool(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
