//! JSON snapshot of the cart as stored under a single key.

use super::errors::CartError;
use super::model::{Cart, CartItem};

/// Key the cart is stored under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "@GoMarketplace";

pub fn encode(cart: &Cart) -> Result<Vec<u8>, CartError> {
    serde_json::to_vec(cart.items()).map_err(|_| CartError::Serialization)
}

pub fn decode(bytes: &[u8]) -> Result<Cart, CartError> {
    let items: Vec<CartItem> =
        serde_json::from_slice(bytes).map_err(|e| CartError::Corrupted(e.to_string()))?;
    Ok(Cart::from_items(items))
}
