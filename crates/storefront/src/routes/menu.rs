//! Catalog route handlers: listing, buying and editing products.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;

use turnstile_core::{CurrencyCode, Price, ProductId};

use super::NavUser;
use crate::config::CatalogEditPolicy;
use crate::error::{AppError, add_breadcrumb};
use crate::middleware::{CatalogEditor, RequireUser};
use crate::models::Product;
use crate::services::catalog::{CatalogService, ProductEdit};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Full product edit form.
#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub description: String,
    pub stock: String,
}

/// Stock-only edit form.
#[derive(Debug, Deserialize)]
pub struct StockForm {
    pub stock: String,
}

// =============================================================================
// View Types
// =============================================================================

/// Product as rendered in the menu.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    /// Formatted for display, e.g. `2999.00 ₽`.
    pub price: String,
    /// Raw amount used to prefill the edit form.
    pub price_input: String,
    pub description: String,
    pub stock: i64,
    pub in_stock: bool,
}

impl ProductView {
    fn new(product: Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id,
            price: Price::new(product.price, currency).to_string(),
            price_input: product.price.to_string(),
            in_stock: product.stock >= 1,
            name: product.name,
            description: product.description,
            stock: product.stock,
        }
    }
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu.html")]
pub struct MenuTemplate {
    pub current_user: Option<NavUser>,
    pub products: Vec<ProductView>,
    pub can_edit: bool,
}

fn parse_stock(input: &str) -> Result<i64, AppError> {
    input
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("stock must be a whole number, got '{input}'")))
}

// =============================================================================
// Handlers
// =============================================================================

/// List the whole catalog.
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse, AppError> {
    let currency = state.config().currency;
    let products = CatalogService::new(state.pool())
        .list()
        .await?
        .into_iter()
        .map(|p| ProductView::new(p, currency))
        .collect();

    let can_edit = match state.config().catalog_edit_policy {
        CatalogEditPolicy::Open => true,
        CatalogEditPolicy::AdminOnly => user.is_admin,
    };

    Ok(MenuTemplate {
        current_user: Some(NavUser::from(&user)),
        products,
        can_edit,
    })
}

/// Buy one unit of a product.
///
/// Missing products and exhausted stock are rejected with `400`.
pub async fn buy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    CatalogService::new(state.pool()).purchase(user.id, id).await?;
    let product_id = id.to_string();
    add_breadcrumb(
        "commerce",
        "Bought product",
        Some(&[("product_id", product_id.as_str())]),
    );

    Ok(Redirect::to("/menu"))
}

/// Replace a product's name, price, description and stock.
///
/// Editing a product that doesn't exist is silently ignored.
pub async fn edit(
    State(state): State<AppState>,
    CatalogEditor(editor): CatalogEditor,
    Path(id): Path<ProductId>,
    Form(form): Form<EditForm>,
) -> Result<Redirect, AppError> {
    let stock = parse_stock(&form.stock)?;

    let changed = CatalogService::new(state.pool())
        .edit(
            id,
            ProductEdit {
                name: &form.name,
                price: &form.price,
                description: &form.description,
                stock,
            },
        )
        .await?;

    if changed {
        tracing::info!(
            product_id = %id,
            editor = ?editor.as_ref().map(|u| u.id),
            "Product edited"
        );
    }

    Ok(Redirect::to("/menu"))
}

/// Overwrite a product's stock.
pub async fn update_stock(
    State(state): State<AppState>,
    CatalogEditor(editor): CatalogEditor,
    Path(id): Path<ProductId>,
    Form(form): Form<StockForm>,
) -> Result<Redirect, AppError> {
    let stock = parse_stock(&form.stock)?;

    if CatalogService::new(state.pool()).update_stock(id, stock).await? {
        tracing::info!(
            product_id = %id,
            stock,
            editor = ?editor.as_ref().map(|u| u.id),
            "Stock updated"
        );
    }

    Ok(Redirect::to("/menu"))
}
