use serde::{Deserialize, Serialize};

/// One line item of the cart. Field names are the persisted format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
}

/// Catalog product as handed over by the UI when adding to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

impl NewCartItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    pub fn into_line_item(self) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

/// Outcome of a single cart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Added,
    Merged { quantity: u32 },
    Incremented { quantity: u32 },
    Decremented { quantity: u32 },
    Removed,
    Unchanged,
}

impl CartChange {
    pub fn is_changed(&self) -> bool {
        !matches!(self, CartChange::Unchanged)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartSummary {
    /// Number of distinct products.
    pub line_items: usize,
    /// Sum of all quantities.
    pub total_items: u64,
    pub total_price: f64,
}

/// Ordered list of line items, unique by `id`, every quantity at least 1.
///
/// Items keep the position they were first added at; only removal changes
/// the relative order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from a persisted list.
    ///
    /// Repeated ids are collapsed into the first occurrence with their
    /// quantities summed, and zero-quantity entries are dropped.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart.position(&item.id) {
                Some(index) => {
                    let existing = &mut cart.items[index];
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            line_items: self.len(),
            total_items: self.total_items(),
            total_price: self.total_price(),
        }
    }

    /// Adds one unit of `product`, merging into an existing line item with
    /// the same id.
    pub fn add(&mut self, product: NewCartItem) -> CartChange {
        match self.position(&product.id) {
            Some(index) => {
                let item = &mut self.items[index];
                item.quantity = item.quantity.saturating_add(1);
                CartChange::Merged {
                    quantity: item.quantity,
                }
            }
            None => {
                self.items.push(product.into_line_item());
                CartChange::Added
            }
        }
    }

    /// Unknown ids leave the cart untouched.
    pub fn increment(&mut self, id: &str) -> CartChange {
        match self.position(id) {
            Some(index) => {
                let item = &mut self.items[index];
                item.quantity = item.quantity.saturating_add(1);
                CartChange::Incremented {
                    quantity: item.quantity,
                }
            }
            None => CartChange::Unchanged,
        }
    }

    /// Removes the line item once its quantity reaches zero.
    pub fn decrement(&mut self, id: &str) -> CartChange {
        let Some(index) = self.position(id) else {
            return CartChange::Unchanged;
        };

        let remaining = self.items[index].quantity.saturating_sub(1);
        if remaining == 0 {
            self.items.remove(index);
            return CartChange::Removed;
        }

        self.items[index].quantity = remaining;
        CartChange::Decremented {
            quantity: remaining,
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}
