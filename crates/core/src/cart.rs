//! Session cart and line items.
//!
//! The cart lives in the browsing session (serialized by the storefront's
//! session layer) and is plain data here. A line's quantity is always at
//! least 1: setting it to zero removes the line instead of persisting a
//! zero-quantity row.

use serde::{Deserialize, Serialize};

use crate::types::Won;

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier (catalog SKU).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub unit_price: Won,
    /// Quantity, always >= 1.
    pub quantity: u32,
    /// Product image path.
    pub image_ref: String,
}

impl CartItem {
    /// Line total (`unit_price * quantity`), saturating on overflow.
    #[must_use]
    pub fn line_total(&self) -> Won {
        self.unit_price
            .checked_mul(self.quantity)
            .unwrap_or(Won::new(i64::MAX))
    }
}

/// The session cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in the cart.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item; if a line with the same product id exists, quantities
    /// merge instead of creating a duplicate line.
    pub fn add(&mut self, item: CartItem) {
        if item.quantity == 0 {
            return;
        }
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Set a line's quantity. Zero removes the line.
    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(item_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
            item.quantity = quantity;
        }
    }

    /// Remove a line entirely.
    pub fn remove(&mut self, item_id: &str) {
        self.items.retain(|i| i.id != item_id);
    }

    /// Drop every line (after a completed order).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Sum of line totals.
    #[must_use]
    pub fn merchandise_total(&self) -> Won {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Display name for the whole order: the first item's name, with an
    /// "and N more" style suffix when there are multiple lines.
    #[must_use]
    pub fn order_name(&self) -> String {
        match self.items.as_slice() {
            [] => String::new(),
            [only] => only.name.clone(),
            [first, rest @ ..] => format!("{} and {} more", first.name, rest.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_wash(quantity: u32) -> CartItem {
        CartItem {
            id: "bodywash-01".to_owned(),
            name: "Driftwell Body Wash".to_owned(),
            unit_price: Won::new(18000),
            quantity,
            image_ref: "/static/bottle.jpg".to_owned(),
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        cart.add(body_wash(1));
        cart.add(body_wash(2));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let mut cart = Cart::new();
        cart.add(body_wash(2));
        cart.set_quantity("bodywash-01", 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let mut cart = Cart::new();
        cart.add(body_wash(0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merchandise_total() {
        let mut cart = Cart::new();
        cart.add(body_wash(3));
        assert_eq!(cart.merchandise_total(), Won::new(54000));
    }

    #[test]
    fn test_order_name() {
        let mut cart = Cart::new();
        assert_eq!(cart.order_name(), "");
        cart.add(body_wash(1));
        assert_eq!(cart.order_name(), "Driftwell Body Wash");
        cart.add(CartItem {
            id: "soap-02".to_owned(),
            name: "Bar Soap".to_owned(),
            unit_price: Won::new(6000),
            quantity: 1,
            image_ref: "/static/soap.jpg".to_owned(),
        });
        assert_eq!(cart.order_name(), "Driftwell Body Wash and 1 more");
    }
}
