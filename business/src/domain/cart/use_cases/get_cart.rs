use async_trait::async_trait;

use crate::domain::cart::errors::CartError;
use crate::domain::cart::model::{CartItem, CartSummary};

#[derive(Debug, Clone)]
pub struct CartView {
    pub products: Vec<CartItem>,
    pub summary: CartSummary,
}

#[async_trait]
pub trait GetCartUseCase: Send + Sync {
    async fn execute(&self) -> Result<CartView, CartError>;
}
