//! The product catalog.
//!
//! The shop sells a single product. Until that changes, the catalog is a
//! static table rather than a database concern. Prices here are the only
//! prices the server trusts; client-submitted amounts are never used.

use driftwell_core::{CartItem, Won};

/// A sellable product.
#[derive(Debug, Clone)]
pub struct Product {
    /// Stable product identifier used in cart lines and URLs.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Unit price.
    pub price: Won,
    /// Short tagline shown on the home page.
    pub tagline: &'static str,
    /// Long-form description for the product page.
    pub description: &'static str,
    /// Path to the product image, served from the static directory.
    pub image_ref: &'static str,
}

/// Every product the shop sells.
pub const PRODUCTS: &[Product] = &[Product {
    id: "bodywash-01",
    name: "Driftwell Body Wash",
    price: Won::new(18_000),
    tagline: "A slow-lather body wash for the end of the day",
    description: "Driftwell is a low-scent, sulfate-free body wash built around \
        fermented rice water and cedarwood. One bottle, 480ml, made in small \
        batches in Gyeonggi-do.",
    image_ref: "/static/img/bodywash-01.jpg",
}];

/// Look up a product by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}

/// The featured product for the home page.
///
/// # Panics
///
/// Never panics; the catalog is a non-empty constant.
#[must_use]
pub fn featured() -> &'static Product {
    &PRODUCTS[0]
}

impl Product {
    /// Build a cart line for `quantity` units of this product.
    #[must_use]
    pub fn to_cart_item(&self, quantity: u32) -> CartItem {
        CartItem {
            id: self.id.to_owned(),
            name: self.name.to_owned(),
            unit_price: self.price,
            quantity,
            image_ref: self.image_ref.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_product() {
        let product = find("bodywash-01").expect("catalog product");
        assert_eq!(product.name, "Driftwell Body Wash");
        assert_eq!(product.price, Won::new(18_000));
    }

    #[test]
    fn test_find_unknown_product() {
        assert!(find("no-such-sku").is_none());
    }

    #[test]
    fn test_to_cart_item_carries_catalog_price() {
        let item = featured().to_cart_item(2);
        assert_eq!(item.unit_price, Won::new(18_000));
        assert_eq!(item.line_total(), Won::new(36_000));
    }
}
