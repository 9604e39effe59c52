//! Shopping cart and delivery quote.
//!
//! The cart is owned by whoever builds it (one per request in the web
//! layer). Quantities never go below one: an item whose quantity reaches
//! zero is removed.

use serde::{Deserialize, Serialize};

use crate::domain::{Price, RouteId};
use crate::resolver::RouteDetails;

/// Error from cart operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("no item {0} in the cart")]
    UnknownItem(String),

    #[error("the cart is empty")]
    Empty,

    #[error("route {0} is not available for delivery")]
    RouteUnavailable(RouteId),
}

/// A dish as offered by a restaurant menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: Price,
}

/// A menu item with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub item: MenuItem,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Price {
        self.item.price * self.quantity
    }
}

/// Subtotal, delivery fee and total for a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in the order they were first added.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one of `item`, or one more if it is already in the cart.
    pub fn add(&mut self, item: MenuItem) {
        self.add_quantity(item, 1);
    }

    /// Add `quantity` of `item`. Adding zero does nothing.
    pub fn add_quantity(&mut self, item: MenuItem, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.position(&item.id) {
            Some(i) => self.items[i].quantity = self.items[i].quantity.saturating_add(quantity),
            None => self.items.push(CartItem { item, quantity }),
        }
    }

    pub fn increment(&mut self, item_id: &str) -> Result<u32, CartError> {
        let i = self.require(item_id)?;
        self.items[i].quantity = self.items[i].quantity.saturating_add(1);
        Ok(self.items[i].quantity)
    }

    /// One fewer of `item_id`; removes it at zero. Returns the new quantity.
    pub fn decrement(&mut self, item_id: &str) -> Result<u32, CartError> {
        let i = self.require(item_id)?;
        let quantity = self.items[i].quantity.saturating_sub(1);
        self.store(i, quantity);
        Ok(quantity)
    }

    /// Set the quantity of `item_id`; zero removes it.
    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) -> Result<(), CartError> {
        let i = self.require(item_id)?;
        self.store(i, quantity);
        Ok(())
    }

    pub fn remove(&mut self, item_id: &str) -> Result<CartItem, CartError> {
        let i = self.require(item_id)?;
        Ok(self.items.remove(i))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all items.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, i| count.saturating_add(i.quantity))
    }

    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn total(&self, delivery_fee: Price) -> Price {
        self.subtotal() + delivery_fee
    }

    /// Checkout figures for delivery along `route`.
    pub fn quote(&self, route: &RouteDetails) -> Result<Quote, CartError> {
        if self.is_empty() {
            return Err(CartError::Empty);
        }
        if !route.is_available {
            return Err(CartError::RouteUnavailable(route.route_id.clone()));
        }
        Ok(Quote {
            subtotal: self.subtotal(),
            delivery_fee: route.price,
            total: self.total(route.price),
        })
    }

    fn position(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.item.id == item_id)
    }

    fn require(&self, item_id: &str) -> Result<usize, CartError> {
        self.position(item_id)
            .ok_or_else(|| CartError::UnknownItem(item_id.to_string()))
    }

    fn store(&mut self, index: usize, quantity: u32) {
        if quantity == 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = quantity;
        }
    }
}
