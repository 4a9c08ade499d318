//! Turnstile Core - Shared domain types.
//!
//! This crate provides the types shared by the Turnstile components:
//! - `storefront` - The membership storefront web server
//! - `cli` - Operator tooling for migrations, seeding and admin grants
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Database encoding for the id newtypes is opt-in via the `sqlite` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices and usernames

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
