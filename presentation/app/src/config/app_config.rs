use std::env;

use business::application::cart::config::CartConfig;

use super::{ConfigError, cart_config, storage_config::StorageConfig};

pub struct AppConfig {
    pub storage: StorageConfig,
    pub cart: CartConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            storage: StorageConfig::from_lookup(&lookup)?,
            cart: cart_config::from_lookup(&lookup)?,
        })
    }
}
