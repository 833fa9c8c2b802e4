use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row};
use std::time::Instant;

use super::query_builder::{QueryBuilder, SqlParam, SqlResult};
use super::store::{
    document_id, Aggregation, Document, DocumentPatch, DocumentStore, GroupBucket, StoreError,
};
use crate::config;
use crate::filter::{FilterError, FilterPredicate, SortSpec};

/// Documents of every collection live in one JSONB table keyed by (collection, id).
const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        doc JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (collection, id)
    )
"#;

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

impl From<FilterError> for StoreError {
    fn from(err: FilterError) -> Self {
        StoreError::QueryError(err.to_string())
    }
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match p {
        SqlParam::Text(s) => q.bind(s),
        SqlParam::Int(i) => q.bind(*i),
    }
}

fn prepare(sql: &SqlResult) -> sqlx::query::Query<'_, sqlx::Postgres, PgArguments> {
    let mut q = sqlx::query(&sql.query);
    for p in sql.params.iter() {
        q = bind_param(q, p);
    }
    q
}

fn log_timing(label: &str, collection: &str, started: Instant) {
    let elapsed = started.elapsed().as_millis() as u64;
    let threshold = config::config().database.slow_query_threshold_ms;
    if elapsed > threshold {
        tracing::warn!("Slow {} on '{}': {}ms (threshold {}ms)", label, collection, elapsed, threshold);
    }
}

/// Rows come back as (id, doc); the id column is authoritative for `_id`.
fn row_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    let id: String = row.try_get("id")?;
    let doc: Value = row.try_get("doc")?;
    let mut doc = match doc {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::QueryError(format!(
                "document {} is not an object (found {})",
                id,
                type_name(&other)
            )))
        }
    };
    doc.insert("_id".to_string(), Value::String(id));
    Ok(doc)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn count(&self, collection: &str, predicate: &FilterPredicate) -> Result<u64, StoreError> {
        let sql = QueryBuilder::count(collection, predicate)?;
        if config::config().query.debug_logging {
            tracing::debug!("count sql: {}", sql.query);
        }
        let started = Instant::now();
        let row = prepare(&sql).fetch_one(&self.pool).await?;
        log_timing("count", collection, started);
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn find(
        &self,
        collection: &str,
        predicate: &FilterPredicate,
        sort: &SortSpec,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>, StoreError> {
        let sql = QueryBuilder::find(collection, predicate, sort, skip, limit)?;
        if config::config().query.debug_logging {
            tracing::debug!("find sql: {}", sql.query);
        }
        let started = Instant::now();
        let rows = prepare(&sql).fetch_all(&self.pool).await?;
        log_timing("find", collection, started);
        rows.iter().map(row_document).collect()
    }

    async fn aggregate(
        &self,
        collection: &str,
        predicate: &FilterPredicate,
        aggregation: &Aggregation<'_>,
    ) -> Result<Vec<GroupBucket>, StoreError> {
        let sql = QueryBuilder::aggregate(collection, predicate, aggregation)?;
        let started = Instant::now();
        let rows = prepare(&sql).fetch_all(&self.pool).await?;
        log_timing("aggregate", collection, started);

        rows.iter()
            .map(|row| -> Result<GroupBucket, StoreError> {
                let key: Option<String> = row.try_get("key")?;
                let count: i64 = row.try_get("count")?;
                let sum: Decimal = row.try_get("sum")?;
                Ok(GroupBucket { key, count: count.max(0) as u64, sum })
            })
            .collect()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, doc FROM documents
               WHERE collection = $1 AND id = $2 AND NOT (doc @> '{"isDeleted": true}'::jsonb)"#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_document).transpose()
    }

    async fn update(&self, collection: &str, id: &str, patch: DocumentPatch) -> Result<Option<Document>, StoreError> {
        let set = Value::Object(patch.set);
        let row = match patch.push {
            Some((field, value)) => {
                sqlx::query(
                    r#"UPDATE documents
                       SET doc = jsonb_set(
                           doc || $3::jsonb,
                           ARRAY[$4::text],
                           COALESCE(doc -> $4::text, '[]'::jsonb) || jsonb_build_array($5::jsonb),
                           true)
                       WHERE collection = $1 AND id = $2 AND NOT (doc @> '{"isDeleted": true}'::jsonb)
                       RETURNING id, doc"#,
                )
                .bind(collection)
                .bind(id)
                .bind(&set)
                .bind(&field)
                .bind(&value)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"UPDATE documents SET doc = doc || $3::jsonb
                       WHERE collection = $1 AND id = $2 AND NOT (doc @> '{"isDeleted": true}'::jsonb)
                       RETURNING id, doc"#,
                )
                .bind(collection)
                .bind(id)
                .bind(&set)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        row.as_ref().map(row_document).transpose()
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        let id = document_id(&doc).unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        doc.remove("_id");
        let inserted = sqlx::query(
            "INSERT INTO documents (collection, id, doc) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING RETURNING id",
        )
        .bind(collection)
        .bind(&id)
        .bind(Value::Object(doc))
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(_) => Ok(id),
            None => Err(StoreError::Conflict(format!("{collection}/{id} already exists"))),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
