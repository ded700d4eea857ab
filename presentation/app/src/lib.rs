use dotenvy::dotenv;

pub mod config;
pub mod setup;

use config::app_config::AppConfig;
use setup::dependency_injection::DependencyContainer;

/// Cart bootstrap for the host application.
///
/// Layout:
/// - config/: storage backend and cart settings read from the environment
/// - setup/: tracing initialization and dependency wiring
///
/// Must be awaited from within a Tokio runtime; the returned container owns
/// the cart scope for the rest of the process.
pub async fn bootstrap() -> anyhow::Result<DependencyContainer> {
    // 1. Initialize tracing with RUST_LOG env filter
    setup::telemetry::init_tracing();

    // 2. Load environment variables
    dotenv().ok();

    // 3. Load configuration
    let config = AppConfig::from_env()?;

    // 4. Wire dependencies
    let container = DependencyContainer::new(&config).await?;

    Ok(container)
}
