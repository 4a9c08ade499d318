//! Purchase records.

use chrono::{DateTime, Utc};

use turnstile_core::{ProductId, PurchaseId, UserId};

/// A recorded purchase of one unit of a product.
#[derive(Debug, Clone)]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

/// A purchase joined with the product name, for purchase history views.
#[derive(Debug, Clone)]
pub struct PurchaseSummary {
    pub id: PurchaseId,
    pub product_id: ProductId,
    pub product_name: String,
    pub created_at: DateTime<Utc>,
}
