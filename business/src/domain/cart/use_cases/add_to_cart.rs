use async_trait::async_trait;

use crate::domain::cart::errors::CartError;
use crate::domain::cart::model::{CartItem, NewCartItem};

pub struct AddToCartParams {
    pub product: NewCartItem,
}

#[async_trait]
pub trait AddToCartUseCase: Send + Sync {
    async fn execute(&self, params: AddToCartParams) -> Result<Vec<CartItem>, CartError>;
}
