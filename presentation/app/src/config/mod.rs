pub mod app_config;
pub mod cart_config;
pub mod storage_config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config.invalid: {key}={value}")]
    Invalid { key: &'static str, value: String },
}
