use std::sync::Arc;

use logger::TracingLogger;

use business::application::cart::add_to_cart::AddToCartUseCaseImpl;
use business::application::cart::decrement::DecrementCartItemUseCaseImpl;
use business::application::cart::get_cart::GetCartUseCaseImpl;
use business::application::cart::increment::IncrementCartItemUseCaseImpl;
use business::application::cart::provider::{CartHandle, CartProvider};
use business::domain::cart::use_cases::add_to_cart::AddToCartUseCase;
use business::domain::cart::use_cases::decrement::DecrementCartItemUseCase;
use business::domain::cart::use_cases::get_cart::GetCartUseCase;
use business::domain::cart::use_cases::increment::IncrementCartItemUseCase;

use crate::config::app_config::AppConfig;
use crate::config::storage_config::init_store;

pub struct DependencyContainer {
    pub provider: CartProvider,
    pub add_to_cart: Arc<dyn AddToCartUseCase>,
    pub increment: Arc<dyn IncrementCartItemUseCase>,
    pub decrement: Arc<dyn DecrementCartItemUseCase>,
    pub get_cart: Arc<dyn GetCartUseCase>,
}

impl DependencyContainer {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let logger = Arc::new(TracingLogger);

        // Infrastructure adapters
        let store = init_store(&config.storage).await?;

        // Cart scope
        let provider = CartProvider::activate(store, logger.clone(), config.cart.clone());
        let cart = provider.handle();

        // Cart use cases
        let add_to_cart = Arc::new(AddToCartUseCaseImpl {
            cart: cart.clone(),
            logger: logger.clone(),
        });
        let increment = Arc::new(IncrementCartItemUseCaseImpl {
            cart: cart.clone(),
            logger: logger.clone(),
        });
        let decrement = Arc::new(DecrementCartItemUseCaseImpl {
            cart: cart.clone(),
            logger: logger.clone(),
        });
        let get_cart = Arc::new(GetCartUseCaseImpl { cart, logger });

        Ok(Self {
            provider,
            add_to_cart,
            increment,
            decrement,
            get_cart,
        })
    }

    pub fn cart(&self) -> CartHandle {
        self.provider.handle()
    }

    /// Closes the cart scope after draining pending writes.
    pub async fn shutdown(self) {
        self.provider.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::storage_config::{StorageBackend, StorageConfig};
    use business::application::cart::config::CartConfig;
    use business::domain::cart::errors::CartError;
    use business::domain::cart::model::NewCartItem;
    use business::domain::cart::use_cases::add_to_cart::AddToCartParams;
    use business::domain::cart::use_cases::decrement::DecrementCartItemParams;
    use business::domain::cart::use_cases::increment::IncrementCartItemParams;

    fn memory_config() -> AppConfig {
        AppConfig {
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                database_url: String::new(),
            },
            cart: CartConfig::default(),
        }
    }

    fn shoe() -> AddToCartParams {
        AddToCartParams {
            product: NewCartItem::new("a", "Shoe", "u", 10.0),
        }
    }

    #[tokio::test]
    async fn should_wire_cart_use_cases() {
        let container = DependencyContainer::new(&memory_config()).await.unwrap();
        container.cart().wait_until_loaded().await.unwrap();

        container.add_to_cart.execute(shoe()).await.unwrap();
        container.add_to_cart.execute(shoe()).await.unwrap();
        container
            .increment
            .execute(IncrementCartItemParams {
                id: "a".to_string(),
            })
            .await
            .unwrap();
        let view = container.get_cart.execute().await.unwrap();
        assert_eq!(view.products[0].quantity, 3);

        for expected in [2, 1] {
            let products = container
                .decrement
                .execute(DecrementCartItemParams {
                    id: "a".to_string(),
                })
                .await
                .unwrap();
            assert_eq!(products[0].quantity, expected);
        }
        let products = container
            .decrement
            .execute(DecrementCartItemParams {
                id: "a".to_string(),
            })
            .await
            .unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn should_close_cart_scope_on_shutdown() {
        let container = DependencyContainer::new(&memory_config()).await.unwrap();
        let cart = container.cart();

        container.shutdown().await;

        assert_eq!(cart.products(), Err(CartError::OutsideScope));
    }
}
