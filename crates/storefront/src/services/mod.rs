//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `account` - Member profile edits and purchase history
//! - `catalog` - Catalog listing, purchases and product edits

pub mod account;
pub mod auth;
pub mod catalog;
