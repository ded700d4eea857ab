use async_trait::async_trait;

use crate::domain::cart::errors::CartError;
use crate::domain::cart::model::CartItem;

pub struct IncrementCartItemParams {
    pub id: String,
}

#[async_trait]
pub trait IncrementCartItemUseCase: Send + Sync {
    async fn execute(&self, params: IncrementCartItemParams)
    -> Result<Vec<CartItem>, CartError>;
}
