use async_trait::async_trait;

use crate::domain::errors::RepositoryError;

/// Asynchronous key-value store holding serialized values on the device.
///
/// The cart addresses a single key and always writes the whole value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when nothing was ever stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError>;
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), RepositoryError>;
}
