//! Domain models for storefront.
//!
//! These types are validated domain objects, separate from the database row
//! types in [`crate::db`].

pub mod product;
pub mod purchase;
pub mod session;
pub mod user;

pub use product::{Product, ProductUpdate};
pub use purchase::{Purchase, PurchaseSummary};
pub use session::keys as session_keys;
pub use user::{NewUser, User};
