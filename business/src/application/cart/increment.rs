use std::sync::Arc;

use async_trait::async_trait;

use super::provider::CartHandle;
use crate::domain::cart::errors::CartError;
use crate::domain::cart::model::{CartChange, CartItem};
use crate::domain::cart::use_cases::increment::{
    IncrementCartItemParams, IncrementCartItemUseCase,
};
use crate::domain::logger::Logger;

pub struct IncrementCartItemUseCaseImpl {
    pub cart: CartHandle,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl IncrementCartItemUseCase for IncrementCartItemUseCaseImpl {
    async fn execute(
        &self,
        params: IncrementCartItemParams,
    ) -> Result<Vec<CartItem>, CartError> {
        let mutation = self.cart.increment(&params.id).await?;

        if let CartChange::Incremented { quantity } = mutation.change {
            self.logger.info(&format!(
                "Incremented cart item {} to {}",
                params.id, quantity
            ));
        } else {
            self.logger
                .debug(&format!("Cart item {} not found, nothing to increment", params.id));
        }
        Ok(mutation.products)
    }
}
