//! Catalog records: products and their remote stock levels.

use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product, as served by the catalog and as stored in a cart line.
///
/// The catalog does not send `amount`; it is zero until the cart sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(alias = "name")]
    pub title: String,
    pub price: Price,
    #[serde(alias = "imageUrl")]
    pub image: String,
    /// Quantity of this product currently in the cart.
    #[serde(default)]
    pub amount: u32,
}

impl Product {
    /// Price of this line: unit price times amount.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.amount
    }
}

/// Units of a product available at the catalog.
///
/// The catalog may report a negative level; it decodes as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    #[serde(deserialize_with = "non_negative")]
    pub amount: u32,
}

fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let amount = i64::deserialize(deserializer)?;
    Ok(u32::try_from(amount.clamp(0, i64::from(u32::MAX))).unwrap_or(u32::MAX))
}

impl Stock {
    /// Whether at least `requested` units are available.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        self.amount >= requested
    }

    /// Stock left after `taken` units are reserved, floored at zero.
    #[must_use]
    pub const fn remaining_after(&self, taken: u32) -> u32 {
        self.amount.saturating_sub(taken)
    }
}
