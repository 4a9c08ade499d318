//! Purchase repository.
//!
//! A purchase decrements the product's stock and records a `purchases` row in
//! one transaction. The decrement is guarded (`stock >= 1`) in the same
//! statement, so concurrent purchases of the last unit cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use turnstile_core::{ProductId, PurchaseId, UserId};

use super::RepositoryError;
use crate::models::purchase::{Purchase, PurchaseSummary};

/// Result of attempting to buy one unit of a product.
#[derive(Debug)]
pub enum PurchaseOutcome {
    /// Stock was decremented and the purchase recorded.
    Completed(Purchase),
    /// No product has the requested id.
    ProductNotFound,
    /// The product exists but has no remaining stock.
    OutOfStock,
}

#[derive(sqlx::FromRow)]
struct PurchaseRow {
    id: PurchaseId,
    user_id: UserId,
    product_id: ProductId,
    created_at: DateTime<Utc>,
}

impl From<PurchaseRow> for Purchase {
    fn from(r: PurchaseRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            product_id: r.product_id,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PurchaseSummaryRow {
    id: PurchaseId,
    product_id: ProductId,
    product_name: String,
    created_at: DateTime<Utc>,
}

/// Repository for purchase database operations.
pub struct PurchaseRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Buy one unit of `product_id` for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement or the commit fails;
    /// the transaction is rolled back in that case.
    pub async fn purchase(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<PurchaseOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let decremented = sqlx::query("UPDATE products SET stock = stock - 1 WHERE id = ?1 AND stock >= 1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        if decremented.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;

            return Ok(if exists.is_some() {
                PurchaseOutcome::OutOfStock
            } else {
                PurchaseOutcome::ProductNotFound
            });
        }

        let row = sqlx::query_as::<_, PurchaseRow>(
            r"
            INSERT INTO purchases (user_id, product_id, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING id, user_id, product_id, created_at
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PurchaseOutcome::Completed(row.into()))
    }

    /// A member's purchases, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PurchaseSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, PurchaseSummaryRow>(
            r"
            SELECT p.id, p.product_id, pr.name AS product_name, p.created_at
            FROM purchases p
            JOIN products pr ON pr.id = p.product_id
            WHERE p.user_id = ?1
            ORDER BY p.created_at DESC, p.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PurchaseSummary {
                id: r.id,
                product_id: r.product_id,
                product_name: r.product_name,
                created_at: r.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use turnstile_core::Username;

    use super::*;
    use crate::db::test_support::memory_pool;
    use crate::db::{ProductRepository, UserRepository};
    use crate::models::{NewUser, ProductUpdate};

    async fn fixture(pool: &SqlitePool, stock: i64) -> (UserId, ProductId) {
        let user = UserRepository::new(pool)
            .create(&NewUser {
                username: Username::parse("buyer").unwrap(),
                password_hash: "hash".to_owned(),
                name: "Buyer".to_owned(),
                gender: "female".to_owned(),
                age: 25,
            })
            .await
            .unwrap();
        let product = ProductRepository::new(pool)
            .create(&ProductUpdate {
                name: "Pass".to_owned(),
                price: Decimal::from(2999),
                description: String::new(),
                stock,
            })
            .await
            .unwrap();
        (user.id, product.id)
    }

    async fn purchase_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_purchase_decrements_and_records() {
        let pool = memory_pool().await;
        let (user_id, product_id) = fixture(&pool, 2).await;

        let outcome = PurchaseRepository::new(&pool)
            .purchase(user_id, product_id)
            .await
            .unwrap();
        let PurchaseOutcome::Completed(purchase) = outcome else {
            panic!("expected a completed purchase, got {outcome:?}");
        };
        assert_eq!(purchase.user_id, user_id);
        assert_eq!(purchase.product_id, product_id);

        let product = ProductRepository::new(&pool)
            .get(product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.stock, 1);
        assert_eq!(purchase_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_purchase_out_of_stock_changes_nothing() {
        let pool = memory_pool().await;
        let (user_id, product_id) = fixture(&pool, 0).await;

        let outcome = PurchaseRepository::new(&pool)
            .purchase(user_id, product_id)
            .await
            .unwrap();
        assert!(matches!(outcome, PurchaseOutcome::OutOfStock));

        let product = ProductRepository::new(&pool)
            .get(product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(purchase_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_purchase_negative_stock_is_out_of_stock() {
        let pool = memory_pool().await;
        let (user_id, product_id) = fixture(&pool, -2).await;

        let outcome = PurchaseRepository::new(&pool)
            .purchase(user_id, product_id)
            .await
            .unwrap();
        assert!(matches!(outcome, PurchaseOutcome::OutOfStock));
    }

    #[tokio::test]
    async fn test_purchase_missing_product() {
        let pool = memory_pool().await;
        let (user_id, _) = fixture(&pool, 1).await;

        let outcome = PurchaseRepository::new(&pool)
            .purchase(user_id, ProductId::new(9999))
            .await
            .unwrap();
        assert!(matches!(outcome, PurchaseOutcome::ProductNotFound));
        assert_eq!(purchase_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_last_unit_sells_once() {
        let pool = memory_pool().await;
        let (user_id, product_id) = fixture(&pool, 1).await;
        let purchases = PurchaseRepository::new(&pool);

        let first = purchases.purchase(user_id, product_id).await.unwrap();
        let second = purchases.purchase(user_id, product_id).await.unwrap();
        assert!(matches!(first, PurchaseOutcome::Completed(_)));
        assert!(matches!(second, PurchaseOutcome::OutOfStock));
        assert_eq!(purchase_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let pool = memory_pool().await;
        let (user_id, product_id) = fixture(&pool, 5).await;
        let purchases = PurchaseRepository::new(&pool);

        purchases.purchase(user_id, product_id).await.unwrap();
        purchases.purchase(user_id, product_id).await.unwrap();

        let history = purchases.list_for_user(user_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].id > history[1].id);
        assert_eq!(history[0].product_name, "Pass");

        let other = purchases.list_for_user(UserId::new(777)).await.unwrap();
        assert!(other.is_empty());
    }
}
