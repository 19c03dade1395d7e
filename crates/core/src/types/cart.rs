//! The cart aggregate.
//!
//! A [`Cart`] is an ordered list of [`Product`] lines that upholds two
//! invariants at all times:
//!
//! - no two lines share a [`ProductId`]
//! - every line's `amount` is at least 1
//!
//! The mutators below are the only way to change a cart, and each of them
//! preserves both invariants. Deserialization goes through the same checks,
//! so a cart read back from storage is either valid or rejected as a whole.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// A persisted cart payload that violates a cart invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidCart {
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),
    #[error("product {0} has an amount of zero")]
    EmptyLine(ProductId),
}

/// Ordered, id-unique list of products a user intends to purchase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.items.iter()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Add one unit of `product`.
    ///
    /// If the product already has a line its amount is incremented and the
    /// existing line data is kept; otherwise `product` is appended with an
    /// amount of 1. Returns the line's new amount.
    pub fn add_one(&mut self, product: Product) -> u32 {
        if let Some(line) = self.items.iter_mut().find(|p| p.id == product.id) {
            line.amount = line.amount.saturating_add(1);
            return line.amount;
        }

        self.items.push(Product {
            amount: 1,
            ..product
        });
        1
    }

    /// Remove the line for a product, returning it if it was present.
    pub fn remove(&mut self, id: ProductId) -> Option<Product> {
        let index = self.items.iter().position(|p| p.id == id)?;
        Some(self.items.remove(index))
    }

    /// Overwrite the amount of an existing line.
    ///
    /// Returns `false` (and leaves the cart untouched) if the product has no line.
    pub fn set_amount(&mut self, id: ProductId, amount: NonZeroU32) -> bool {
        match self.items.iter_mut().find(|p| p.id == id) {
            Some(line) => {
                line.amount = amount.get();
                true
            }
            None => false,
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|p| u64::from(p.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(Product::line_total).sum()
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = InvalidCart;

    fn try_from(items: Vec<Product>) -> Result<Self, Self::Error> {
        for (i, line) in items.iter().enumerate() {
            if line.amount == 0 {
                return Err(InvalidCart::EmptyLine(line.id));
            }
            if items.iter().skip(i + 1).any(|other| other.id == line.id) {
                return Err(InvalidCart::DuplicateProduct(line.id));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Tênis {id}"),
            price: Price::from_cents(cents),
            image: format!("https://cdn.example.com/{id}.jpg"),
            amount: 0,
        }
    }

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("non-zero")
    }

    #[test]
    fn test_add_one_appends_new_line_with_amount_one() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_one(product(1, 17990)), 1);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).map(|p| p.amount), Some(1));
    }

    #[test]
    fn test_add_one_twice_increments_instead_of_duplicating() {
        let mut cart = Cart::new();
        cart.add_one(product(1, 17990));
        assert_eq!(cart.add_one(product(1, 17990)), 2);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_add_one_keeps_existing_line_data() {
        let mut cart = Cart::new();
        cart.add_one(product(1, 10000));

        let mut repriced = product(1, 5000);
        repriced.title = "renamed".to_string();
        cart.add_one(repriced);

        let line = cart.get(ProductId::new(1)).expect("line");
        assert_eq!(line.price, Price::from_cents(10000));
        assert_eq!(line.title, "Tênis 1");
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add_one(product(2, 100));

        assert!(cart.remove(ProductId::new(3)).is_none());
        assert_eq!(cart.len(), 1);

        let removed = cart.remove(ProductId::new(2)).expect("removed");
        assert_eq!(removed.id, ProductId::new(2));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_amount_only_touches_existing_lines() {
        let mut cart = Cart::new();
        cart.add_one(product(1, 100));

        assert!(cart.set_amount(ProductId::new(1), nz(3)));
        assert_eq!(cart.get(ProductId::new(1)).map(|p| p.amount), Some(3));

        let before = cart.clone();
        assert!(!cart.set_amount(ProductId::new(9), nz(3)));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_subtotal() {
        let mut cart = Cart::new();
        cart.add_one(product(1, 17990));
        cart.add_one(product(2, 13990));
        cart.set_amount(ProductId::new(1), nz(2));

        assert_eq!(cart.subtotal(), Price::from_cents(17990 * 2 + 13990));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_cart_serializes_as_array() {
        let mut cart = Cart::new();
        cart.add_one(product(1, 17990));

        let value = serde_json::to_value(&cart).expect("serialize");
        assert_eq!(
            value,
            json!([{
                "id": 1,
                "title": "Tênis 1",
                "price": 179.9,
                "image": "https://cdn.example.com/1.jpg",
                "amount": 1
            }])
        );

        let back: Cart = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, cart);
    }

    #[test]
    fn test_deserialize_rejects_duplicate_ids() {
        let payload = json!([
            {"id": 1, "title": "a", "price": 1, "image": "", "amount": 1},
            {"id": 1, "title": "a", "price": 1, "image": "", "amount": 2}
        ]);
        let err = serde_json::from_value::<Cart>(payload).expect_err("duplicate");
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_deserialize_rejects_zero_amount() {
        let payload = json!([{"id": 4, "title": "a", "price": 1, "image": ""}]);
        assert_eq!(
            Cart::try_from(serde_json::from_value::<Vec<Product>>(payload).expect("lines")),
            Err(InvalidCart::EmptyLine(ProductId::new(4)))
        );
    }
}
