//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database)
//!
//! # Auth
//! GET  /register                - Registration form
//! POST /register                - Create account
//! GET  /login                   - Login form
//! POST /login                   - Login action
//! GET  /logout                  - Destroy session
//!
//! # Catalog (requires session)
//! GET  /menu                    - Product list
//! POST /menu/buy/{id}            - Buy one unit
//! POST /menu/edit/{id}           - Replace product fields (edit policy)
//! POST /menu/update_stock/{id}   - Overwrite stock (edit policy)
//!
//! # Profile (requires session)
//! GET  /client/edit             - Profile form and purchase history
//! POST /client/edit             - Update name and gender
//! ```

pub mod auth;
pub mod client;
pub mod health;
pub mod home;
pub mod menu;

use axum::{
    Router,
    routing::{get, post},
};

use crate::models::User;
use crate::state::AppState;

/// The member shown in the page header.
#[derive(Debug, Clone)]
pub struct NavUser {
    pub username: String,
    pub name: String,
    pub is_admin: bool,
}

impl From<&User> for NavUser {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.to_string(),
            name: user.name.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Create the catalog routes router.
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(menu::index))
        .route("/buy/{id}", post(menu::buy))
        .route("/edit/{id}", post(menu::edit))
        .route("/update_stock/{id}", post(menu::update_stock))
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::ready))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .nest("/menu", menu_routes())
        .route("/client/edit", get(client::edit_page).post(client::edit))
        .nest("/health", health_routes())
}
