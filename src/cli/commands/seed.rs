use anyhow::Context;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;
use crate::database::{DatabaseManager, Document, DocumentStore};
use crate::resources;

/// Fixture file shape: `{collection-or-resource: [document, ...]}`. JSON files
/// parse through the YAML reader as well.
pub type Fixture = BTreeMap<String, Vec<Value>>;

pub async fn handle(file: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let fixture: Fixture = serde_yaml::from_str(&raw).with_context(|| format!("failed to parse {}", file.display()))?;

    let manager = DatabaseManager::new(&config().database);
    let store = manager.acquire().await?;
    let inserted = load(store.as_ref(), fixture).await?;

    let total: usize = inserted.values().sum();
    output_success(
        output_format,
        &format!("Seeded {} documents into {} collections", total, inserted.len()),
        Some(json!({ "inserted": inserted })),
    )
}

/// Insert every document, resolving resource names to their collection.
/// Stops at the first failure, including a duplicate id.
pub async fn load(store: &dyn DocumentStore, fixture: Fixture) -> anyhow::Result<BTreeMap<String, usize>> {
    let mut inserted = BTreeMap::new();

    for (name, docs) in fixture {
        let collection = resources::find(&name).map(|r| r.collection.to_string()).unwrap_or(name);
        if !resources::RESOURCES.iter().any(|r| r.collection == collection) {
            tracing::warn!("Collection '{}' is not served by any admin resource", collection);
        }

        let mut count = 0;
        for (index, doc) in docs.into_iter().enumerate() {
            let doc: Document = match doc {
                Value::Object(map) => map,
                other => anyhow::bail!("{}[{}]: expected an object, got {}", collection, index, other),
            };
            store
                .insert(&collection, doc)
                .await
                .with_context(|| format!("{}[{}]: insert failed", collection, index))?;
            count += 1;
        }
        inserted.insert(collection, count);
    }

    Ok(inserted)
}
