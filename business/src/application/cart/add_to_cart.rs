use std::sync::Arc;

use async_trait::async_trait;

use super::provider::CartHandle;
use crate::domain::cart::errors::CartError;
use crate::domain::cart::model::{CartChange, CartItem};
use crate::domain::cart::use_cases::add_to_cart::{AddToCartParams, AddToCartUseCase};
use crate::domain::logger::Logger;

pub struct AddToCartUseCaseImpl {
    pub cart: CartHandle,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl AddToCartUseCase for AddToCartUseCaseImpl {
    async fn execute(&self, params: AddToCartParams) -> Result<Vec<CartItem>, CartError> {
        let id = params.product.id.clone();
        self.logger.info(&format!("Adding product to cart: {}", id));

        let mutation = self.cart.add_to_cart(params.product).await?;

        match mutation.change {
            CartChange::Merged { quantity } => self.logger.info(&format!(
                "Product {} already in cart, quantity now {}",
                id, quantity
            )),
            _ => self.logger.info(&format!("Product {} added to cart", id)),
        }
        Ok(mutation.products)
    }
}
