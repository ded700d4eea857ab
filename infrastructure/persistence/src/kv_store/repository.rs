use async_trait::async_trait;
use sqlx::SqlitePool;

use business::domain::errors::RepositoryError;
use business::domain::storage::KeyValueStore;

use super::entity::KvEntryEntity;

/// Device-local key-value store backed by the `kv_store` table.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError> {
        let entity = sqlx::query_as::<_, KvEntryEntity>(
            "SELECT key, value FROM kv_store WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::warn!(key, error = %e, "kv_store read failed");
            RepositoryError::DatabaseError
        })?;

        Ok(entity.map(|e| e.into_value()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::warn!(key, error = %e, "kv_store write failed");
            RepositoryError::DatabaseError
        })?;

        Ok(())
    }
}
