use std::sync::Arc;

use async_trait::async_trait;

use super::provider::CartHandle;
use crate::domain::cart::errors::CartError;
use crate::domain::cart::use_cases::get_cart::{CartView, GetCartUseCase};
use crate::domain::logger::Logger;

pub struct GetCartUseCaseImpl {
    pub cart: CartHandle,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl GetCartUseCase for GetCartUseCaseImpl {
    async fn execute(&self) -> Result<CartView, CartError> {
        let view = self.cart.view()?;
        self.logger
            .debug(&format!("Retrieved cart with {} line items", view.products.len()));
        Ok(view)
    }
}
