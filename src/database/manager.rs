use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

use super::memory::MemoryStore;
use super::postgres::PgDocumentStore;
use super::store::{StoreError, StoreHandle};
use crate::config::DatabaseConfig;

/// Owns the shared storage handle.
///
/// The store is created on the first `acquire()`; later calls return the same
/// handle. When no URL is configured the in-memory store is used.
pub struct DatabaseManager {
    url: Option<String>,
    max_connections: u32,
    connect_timeout: Duration,
    store: OnceCell<StoreHandle>,
}

impl DatabaseManager {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            connect_timeout: Duration::from_secs(config.connection_timeout_secs),
            store: OnceCell::new(),
        }
    }

    /// Manager already holding `store`; used by tests and fixture tooling.
    pub fn with_store(store: StoreHandle) -> Self {
        Self {
            url: None,
            max_connections: 1,
            connect_timeout: Duration::from_secs(1),
            store: OnceCell::new_with(Some(store)),
        }
    }

    /// Get the store, connecting on first use. Idempotent.
    pub async fn acquire(&self) -> Result<StoreHandle, StoreError> {
        self.store
            .get_or_try_init(|| self.connect())
            .await
            .map(Arc::clone)
    }

    async fn connect(&self) -> Result<StoreHandle, StoreError> {
        let Some(url) = self.url.as_deref() else {
            info!("No DATABASE_URL configured; using in-memory document store");
            return Ok(Arc::new(MemoryStore::new()));
        };

        Self::validate_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.connect_timeout)
            .connect(url)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        let store = PgDocumentStore::new(pool);
        store.ensure_schema().await?;

        info!("Created database pool (max {} connections)", self.max_connections);
        Ok(Arc::new(store))
    }

    fn validate_url(raw: &str) -> Result<(), StoreError> {
        let url = url::Url::parse(raw).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(()),
            _ => Err(StoreError::InvalidDatabaseUrl),
        }
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.acquire().await?.ping().await
    }
}
