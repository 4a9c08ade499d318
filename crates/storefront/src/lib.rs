//! Turnstile storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused by the operator CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::Request, middleware::from_fn};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::SqliteStore;

use crate::db::{ProductRepository, RepositoryError};
use crate::state::AppState;

/// Errors preparing the database for serving.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("seeding failed: {0}")]
    Seed(#[from] RepositoryError),
}

/// Run embedded migrations and seed the default catalog if it is empty.
///
/// # Errors
///
/// Returns `BootstrapError` if either step fails.
pub async fn bootstrap(pool: &SqlitePool) -> Result<(), BootstrapError> {
    db::migrate(pool).await?;
    tracing::info!("Migrations applied");

    let seeded = ProductRepository::new(pool).seed_defaults().await?;
    if seeded > 0 {
        tracing::info!(count = seeded, "Seeded default catalog");
    }

    Ok(())
}

/// Build the full application router.
///
/// Sentry layers are added by the binary on top of this.
pub fn router(state: AppState, session_layer: SessionManagerLayer<SqliteStore>) -> Router {
    routes::routes()
        .layer(session_layer)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(from_fn(middleware::security_headers_middleware))
        .with_state(state)
}
