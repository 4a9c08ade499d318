//! Integration tests for Turnstile.
//!
//! Each test builds the full storefront router against a fresh `SQLite` file in
//! a temporary directory and drives it in-process with
//! [`tower::ServiceExt::oneshot`]. No server or external database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p turnstile-integration-tests
//! ```

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use turnstile_core::ProductId;
use turnstile_storefront::config::{CatalogEditPolicy, StorefrontConfig};
use turnstile_storefront::db::{self, ProductRepository};
use turnstile_storefront::middleware::create_session_layer;
use turnstile_storefront::middleware::session::SESSION_COOKIE_NAME;
use turnstile_storefront::models::Product;
use turnstile_storefront::state::AppState;
use turnstile_storefront::{bootstrap, router};

/// Password used by [`TestApp::register`].
pub const PASSWORD: &str = "correct-horse";

/// A storefront wired to a throwaway database.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

impl TestApp {
    /// Storefront with the default (open) catalog edit policy.
    pub async fn new() -> Self {
        Self::with_policy(CatalogEditPolicy::Open).await
    }

    /// Storefront with an explicit catalog edit policy.
    pub async fn with_policy(policy: CatalogEditPolicy) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let database_url = format!("sqlite://{}", dir.path().join("turnstile.db").display());
        let policy = policy.to_string();

        let config = StorefrontConfig::from_lookup(|key| match key {
            "STOREFRONT_DATABASE_URL" => Some(database_url.clone()),
            "STOREFRONT_CATALOG_EDIT_POLICY" => Some(policy.clone()),
            _ => None,
        })
        .expect("Failed to build test config");

        let pool = db::create_pool(&config.database_url, config.db_max_connections)
            .await
            .expect("Failed to create pool");
        bootstrap(&pool).await.expect("Failed to bootstrap database");
        let session_layer = create_session_layer(&pool, &config)
            .await
            .expect("Failed to create session layer");

        let router = router(AppState::new(config, pool.clone()), session_layer);

        Self {
            router,
            pool,
            _dir: dir,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    /// `GET path`, optionally with a session cookie.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("Valid request"))
            .await
    }

    /// `POST path` with a urlencoded form, optionally with a session cookie.
    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        let mut builder = Request::post(path).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).expect("Valid request"))
            .await
    }

    /// Register a member with [`PASSWORD`] and fixed profile fields.
    pub async fn register(&self, username: &str) -> Response<Body> {
        self.post_form(
            "/register",
            &[
                ("username", username),
                ("password", PASSWORD),
                ("name", "Test Member"),
                ("gender", "female"),
                ("age", "30"),
            ],
            None,
        )
        .await
    }

    /// Log in and return the raw response.
    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        self.post_form(
            "/login",
            &[("username", username), ("password", password)],
            None,
        )
        .await
    }

    /// Register and log in a member, returning the `Cookie` header value.
    pub async fn member(&self, username: &str) -> String {
        self.register(username).await;
        let response = self.login(username, PASSWORD).await;
        session_cookie(&response).expect("Login should issue a session cookie")
    }

    /// Read a product back from the store.
    pub async fn product(&self, id: i64) -> Option<Product> {
        ProductRepository::new(&self.pool)
            .get(ProductId::new(id))
            .await
            .expect("Product lookup failed")
    }

    /// Number of rows in `purchases`.
    pub async fn purchase_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(&self.pool)
            .await
            .expect("Count query failed")
    }

    /// Overwrite a product's stock directly in the store.
    pub async fn set_stock(&self, id: i64, stock: i64) {
        ProductRepository::new(&self.pool)
            .update_stock(ProductId::new(id), stock)
            .await
            .expect("Stock update failed");
    }
}

fn is_session_cookie(header: &str) -> bool {
    header
        .strip_prefix(SESSION_COOKIE_NAME)
        .is_some_and(|rest| rest.starts_with('='))
}

/// The `name=value` part of the session `Set-Cookie` header, if one was sent.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| is_session_cookie(v))
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

/// The full session `Set-Cookie` header, including attributes.
pub fn raw_session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| is_session_cookie(v))
        .map(str::to_owned)
}

/// The `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Collect a response body as UTF-8 text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
