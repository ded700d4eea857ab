use std::time::Duration;

use business::application::cart::config::CartConfig;

use super::ConfigError;

/// Load cart settings
///
/// Environment variables:
/// - CART_STORAGE_KEY: key the cart is stored under (default: "@GoMarketplace")
/// - CART_WRITE_RETRIES: extra attempts after a failed write (default: 2)
/// - CART_RETRY_BACKOFF_MS: pause between attempts (default: 50)
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<CartConfig, ConfigError> {
    let mut config = CartConfig::default();

    if let Some(key) = lookup("CART_STORAGE_KEY") {
        if key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "CART_STORAGE_KEY",
                value: key,
            });
        }
        config.storage_key = key;
    }
    if let Some(value) = lookup("CART_WRITE_RETRIES") {
        config.write_retries = parse_number("CART_WRITE_RETRIES", value)?;
    }
    if let Some(value) = lookup("CART_RETRY_BACKOFF_MS") {
        config.retry_backoff =
            Duration::from_millis(parse_number("CART_RETRY_BACKOFF_MS", value)?);
    }

    Ok(config)
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
