//! Catalog product types.

use rust_decimal::Decimal;

use turnstile_core::ProductId;

/// A purchasable catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Price in the configured currency's standard unit.
    pub price: Decimal,
    pub description: String,
    /// Remaining purchasable quantity. Manual edits may push this below zero.
    pub stock: i64,
}

/// Full replacement of a product's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub stock: i64,
}
