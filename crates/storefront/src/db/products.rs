//! Product repository for catalog operations.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use turnstile_core::ProductId;

use super::RepositoryError;
use crate::models::product::{Product, ProductUpdate};

/// Catalog inserted on first startup when the `products` table is empty.
const DEFAULT_CATALOG: &[(&str, i64, &str, i64)] = &[
    ("Абонемент Стандарт", 2999, "Работает круглосутчно", 10),
    ("Абонемент Молодежный", 1999, "Работает до 18:00", 10),
];

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: String,
    description: String,
    stock: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        let price = Decimal::from_str(&r.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", r.id))
        })?;

        Ok(Self {
            id: r.id,
            name: r.name,
            price,
            description: r.description,
            stock: r.stock,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List the whole catalog, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, description, stock FROM products ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored price is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, description, stock FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &ProductUpdate) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, price, description, stock)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, name, price, description, stock
            ",
        )
        .bind(&product.name)
        .bind(product.price.to_string())
        .bind(&product.description)
        .bind(product.stock)
        .fetch_one(self.pool)
        .await?;

        Product::try_from(row)
    }

    /// Replace a product's mutable fields.
    ///
    /// Returns `false` if no product has this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = ?1, price = ?2, description = ?3, stock = ?4
            WHERE id = ?5
            ",
        )
        .bind(&update.name)
        .bind(update.price.to_string())
        .bind(&update.description)
        .bind(update.stock)
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrite a product's stock count. No floor is applied.
    ///
    /// Returns `false` if no product has this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_stock(&self, id: ProductId, stock: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE products SET stock = ?1 WHERE id = ?2")
            .bind(stock)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert the default catalog if the table is empty.
    ///
    /// Returns the number of products inserted (zero when a catalog already exists).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the check or inserts fail.
    pub async fn seed_defaults(&self) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(0);
        }

        for (name, price, description, stock) in DEFAULT_CATALOG {
            sqlx::query(
                "INSERT INTO products (name, price, description, stock) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(*name)
            .bind(Decimal::from(*price).to_string())
            .bind(*description)
            .bind(*stock)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(DEFAULT_CATALOG.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    fn update(name: &str, price: Decimal, stock: i64) -> ProductUpdate {
        ProductUpdate {
            name: name.to_owned(),
            price,
            description: "desc".to_owned(),
            stock,
        }
    }

    #[tokio::test]
    async fn test_seed_defaults_once() {
        let pool = memory_pool().await;
        let products = ProductRepository::new(&pool);

        assert_eq!(products.seed_defaults().await.unwrap(), 2);
        assert_eq!(products.seed_defaults().await.unwrap(), 0);

        let catalog = products.list().await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].name, "Абонемент Стандарт");
        assert_eq!(catalog[0].price, Decimal::from(2999));
        assert_eq!(catalog[0].stock, 10);
        assert_eq!(catalog[1].name, "Абонемент Молодежный");
        assert_eq!(catalog[1].price, Decimal::from(1999));
        assert_eq!(catalog[1].description, "Работает до 18:00");
    }

    #[tokio::test]
    async fn test_seed_skips_non_empty_catalog() {
        let pool = memory_pool().await;
        let products = ProductRepository::new(&pool);
        products
            .create(&update("Day pass", Decimal::from(300), 1))
            .await
            .unwrap();

        assert_eq!(products.seed_defaults().await.unwrap(), 0);
        assert_eq!(products.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_persists_exact_values() {
        let pool = memory_pool().await;
        let products = ProductRepository::new(&pool);
        let created = products
            .create(&update("Old", Decimal::from(100), 5))
            .await
            .unwrap();

        let new_values = update("New", Decimal::new(123_450, 2), -3);
        assert!(products.update(created.id, &new_values).await.unwrap());

        let stored = products.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "New");
        assert_eq!(stored.price, Decimal::new(123_450, 2));
        assert_eq!(stored.stock, -3);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let pool = memory_pool().await;
        let products = ProductRepository::new(&pool);

        let changed = products
            .update(ProductId::new(404), &update("x", Decimal::ONE, 1))
            .await
            .unwrap();
        assert!(!changed);
        assert!(!products.update_stock(ProductId::new(404), 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_stock_only() {
        let pool = memory_pool().await;
        let products = ProductRepository::new(&pool);
        let created = products
            .create(&update("Pass", Decimal::from(500), 5))
            .await
            .unwrap();

        assert!(products.update_stock(created.id, 42).await.unwrap());

        let stored = products.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 42);
        assert_eq!(stored.name, "Pass");
        assert_eq!(stored.price, Decimal::from(500));
    }

    #[tokio::test]
    async fn test_corrupt_price_is_reported() {
        let pool = memory_pool().await;
        sqlx::query(
            "INSERT INTO products (name, price, description, stock) VALUES ('x', 'lots', '', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = ProductRepository::new(&pool).list().await.unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
