use std::str::FromStr;
use std::sync::Arc;

use business::domain::storage::KeyValueStore;
use persistence::db::{DatabaseConfig, create_sqlite_pool, run_migrations};
use persistence::kv_store::memory::InMemoryKeyValueStore;
use persistence::kv_store::repository::SqliteKeyValueStore;

use super::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::Invalid {
                key: "CART_STORAGE_BACKEND",
                value: value.to_string(),
            }),
        }
    }
}

/// Where the cart is persisted on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: String,
}

impl StorageConfig {
    /// Environment variables:
    /// - CART_STORAGE_BACKEND: "sqlite" or "memory" (default: "sqlite")
    /// - CART_DATABASE_URL: SQLite database URL (default: "sqlite://cart.db")
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("CART_STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Sqlite,
        };
        let database_url =
            lookup("CART_DATABASE_URL").unwrap_or_else(|| "sqlite://cart.db".to_string());

        Ok(Self {
            backend,
            database_url,
        })
    }
}

/// Opens the configured store, running migrations for SQLite
///
/// # Errors
/// Returns error if the database cannot be opened or migrated
pub async fn init_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory cart storage, the cart will not survive restarts");
            Ok(Arc::new(InMemoryKeyValueStore::new()))
        }
        StorageBackend::Sqlite => {
            let pool =
                create_sqlite_pool(&DatabaseConfig::new(config.database_url.clone())).await?;
            run_migrations(&pool).await?;
            tracing::info!(url = %config.database_url, "cart storage ready");
            Ok(Arc::new(SqliteKeyValueStore::new(pool)))
        }
    }
}
