use async_trait::async_trait;

use crate::domain::cart::errors::CartError;
use crate::domain::cart::model::CartItem;

pub struct DecrementCartItemParams {
    pub id: String,
}

#[async_trait]
pub trait DecrementCartItemUseCase: Send + Sync {
    async fn execute(&self, params: DecrementCartItemParams)
    -> Result<Vec<CartItem>, CartError>;
}
