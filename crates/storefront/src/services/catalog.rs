//! Catalog service: browsing, buying and editing products.

use sqlx::SqlitePool;
use thiserror::Error;

use turnstile_core::{Price, PriceError, ProductId, UserId};

use crate::db::{ProductRepository, PurchaseOutcome, PurchaseRepository, RepositoryError};
use crate::models::{Product, ProductUpdate, Purchase};

/// Errors from buying a product.
#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("product not found")]
    ProductNotFound,

    #[error("product is out of stock")]
    OutOfStock,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Errors from editing the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The submitted price did not parse as a non-negative decimal.
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Raw product edit as submitted by the form.
#[derive(Debug, Clone, Copy)]
pub struct ProductEdit<'a> {
    pub name: &'a str,
    pub price: &'a str,
    pub description: &'a str,
    pub stock: i64,
}

/// Catalog service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    purchases: PurchaseRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
            purchases: PurchaseRepository::new(pool),
        }
    }

    /// The full catalog, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.products.list().await
    }

    /// Buy one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns `PurchaseError::ProductNotFound` or `PurchaseError::OutOfStock`
    /// without changing anything when the purchase can't go through.
    pub async fn purchase(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Purchase, PurchaseError> {
        match self.purchases.purchase(user_id, product_id).await? {
            PurchaseOutcome::Completed(purchase) => {
                tracing::info!(
                    user_id = %user_id,
                    product_id = %product_id,
                    purchase_id = %purchase.id,
                    "Purchase completed"
                );
                Ok(purchase)
            }
            PurchaseOutcome::ProductNotFound => Err(PurchaseError::ProductNotFound),
            PurchaseOutcome::OutOfStock => Err(PurchaseError::OutOfStock),
        }
    }

    /// Replace a product's name, price, description and stock.
    ///
    /// Returns `false` if no product has this id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidPrice` if the price doesn't parse.
    pub async fn edit(&self, id: ProductId, edit: ProductEdit<'_>) -> Result<bool, CatalogError> {
        let price = Price::parse_amount(edit.price)?;

        let update = ProductUpdate {
            name: edit.name.to_owned(),
            price,
            description: edit.description.to_owned(),
            stock: edit.stock,
        };

        let changed = self.products.update(id, &update).await?;
        if !changed {
            tracing::debug!(product_id = %id, "Edit of missing product ignored");
        }
        Ok(changed)
    }

    /// Overwrite a product's stock.
    ///
    /// Returns `false` if no product has this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the update fails.
    pub async fn update_stock(&self, id: ProductId, stock: i64) -> Result<bool, RepositoryError> {
        let changed = self.products.update_stock(id, stock).await?;
        if !changed {
            tracing::debug!(product_id = %id, "Stock update of missing product ignored");
        }
        Ok(changed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::test_support::memory_pool;

    fn edit<'a>(price: &'a str) -> ProductEdit<'a> {
        ProductEdit {
            name: " Evening pass ",
            price,
            description: " after 18:00\n",
            stock: 7,
        }
    }

    #[tokio::test]
    async fn test_edit_rejects_bad_price() {
        let pool = memory_pool().await;
        let catalog = CatalogService::new(&pool);
        ProductRepository::new(&pool).seed_defaults().await.unwrap();
        let first = catalog.list().await.unwrap()[0].id;

        let err = catalog.edit(first, edit("cheap")).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPrice(_)));
        let err = catalog.edit(first, edit("-5")).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPrice(PriceError::Negative)));

        let unchanged = catalog.list().await.unwrap();
        assert_eq!(unchanged[0].name, "Абонемент Стандарт");
    }

    #[tokio::test]
    async fn test_edit_persists_fields_verbatim() {
        let pool = memory_pool().await;
        let catalog = CatalogService::new(&pool);
        ProductRepository::new(&pool).seed_defaults().await.unwrap();
        let first = catalog.list().await.unwrap()[0].id;

        assert!(catalog.edit(first, edit("1499,50")).await.unwrap());

        let product = &catalog.list().await.unwrap()[0];
        assert_eq!(product.name, " Evening pass ");
        assert_eq!(product.description, " after 18:00\n");
        assert_eq!(product.price, Decimal::new(149_950, 2));
        assert_eq!(product.stock, 7);
    }

    #[tokio::test]
    async fn test_edit_missing_product_is_noop() {
        let pool = memory_pool().await;
        let catalog = CatalogService::new(&pool);

        assert!(!catalog.edit(ProductId::new(42), edit("10")).await.unwrap());
        assert!(!catalog.update_stock(ProductId::new(42), 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_purchase_errors() {
        let pool = memory_pool().await;
        let catalog = CatalogService::new(&pool);
        ProductRepository::new(&pool).seed_defaults().await.unwrap();
        let first = catalog.list().await.unwrap()[0].id;
        catalog.update_stock(first, 0).await.unwrap();

        // No user row is needed to observe the stock guard.
        let err = catalog.purchase(UserId::new(1), first).await.unwrap_err();
        assert!(matches!(err, PurchaseError::OutOfStock));

        let err = catalog
            .purchase(UserId::new(1), ProductId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::ProductNotFound));
    }
}
