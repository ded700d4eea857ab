use std::time::Duration;

use crate::domain::cart::codec::DEFAULT_CART_KEY;

/// Runtime settings of a cart provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the whole cart is stored under.
    pub storage_key: String,
    /// Extra attempts after a failed write.
    pub write_retries: u32,
    pub retry_backoff: Duration,
}

impl CartConfig {
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            ..Self::default()
        }
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_CART_KEY.to_string(),
            write_retries: 2,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_marketplace_key() {
        let config = CartConfig::default();

        assert_eq!(config.storage_key, "@GoMarketplace");
        assert_eq!(config.write_retries, 2);
    }

    #[test]
    fn should_override_only_storage_key() {
        let config = CartConfig::new("@Cart:test");

        assert_eq!(config.storage_key, "@Cart:test");
        assert_eq!(config.retry_backoff, Duration::from_millis(50));
    }
}
