use std::sync::Arc;

use async_trait::async_trait;

use super::provider::CartHandle;
use crate::domain::cart::errors::CartError;
use crate::domain::cart::model::{CartChange, CartItem};
use crate::domain::cart::use_cases::decrement::{
    DecrementCartItemParams, DecrementCartItemUseCase,
};
use crate::domain::logger::Logger;

pub struct DecrementCartItemUseCaseImpl {
    pub cart: CartHandle,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl DecrementCartItemUseCase for DecrementCartItemUseCaseImpl {
    async fn execute(
        &self,
        params: DecrementCartItemParams,
    ) -> Result<Vec<CartItem>, CartError> {
        let mutation = self.cart.decrement(&params.id).await?;

        match mutation.change {
            CartChange::Decremented { quantity } => self.logger.info(&format!(
                "Decremented cart item {} to {}",
                params.id, quantity
            )),
            CartChange::Removed => self
                .logger
                .info(&format!("Removed cart item {}", params.id)),
            _ => self
                .logger
                .debug(&format!("Cart item {} not found, nothing to decrement", params.id)),
        }
        Ok(mutation.products)
    }
}
