//! Profile route handlers.
//!
//! Members can change their display name and gender. A session whose user row
//! has disappeared gets `404` here rather than a login redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;

use super::NavUser;
use crate::error::AppError;
use crate::middleware::RequireSession;
use crate::models::PurchaseSummary;
use crate::services::account::{AccountError, AccountService};
use crate::state::AppState;

/// Profile edit form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub gender: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub error: Option<String>,
}

/// A past purchase as rendered in the profile page.
#[derive(Debug, Clone)]
pub struct PurchaseView {
    pub product_name: String,
    pub purchased_at: String,
}

impl From<PurchaseSummary> for PurchaseView {
    fn from(p: PurchaseSummary) -> Self {
        Self {
            product_name: p.product_name,
            purchased_at: p.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "client/edit.html")]
pub struct ProfileTemplate {
    pub current_user: Option<NavUser>,
    pub name: String,
    pub gender: String,
    pub age: i64,
    pub purchases: Vec<PurchaseView>,
    pub error: bool,
}

/// Display the profile form with purchase history.
pub async fn edit_page(
    State(state): State<AppState>,
    RequireSession(user_id): RequireSession,
    Query(query): Query<ProfileQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (user, history) = AccountService::new(state.pool()).profile(user_id).await?;

    Ok(ProfileTemplate {
        current_user: Some(NavUser::from(&user)),
        name: user.name,
        gender: user.gender,
        age: user.age,
        purchases: history.into_iter().map(PurchaseView::from).collect(),
        error: query.error.is_some(),
    })
}

/// Update display name and gender.
pub async fn edit(
    State(state): State<AppState>,
    RequireSession(user_id): RequireSession,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect, AppError> {
    match AccountService::new(state.pool())
        .update_profile(user_id, &form.name, &form.gender)
        .await
    {
        Ok(()) => {
            tracing::info!(user_id = %user_id, "Profile updated");
            Ok(Redirect::to("/client/edit"))
        }
        Err(AccountError::InvalidProfile(msg)) => {
            tracing::debug!(user_id = %user_id, reason = %msg, "Profile update rejected");
            Ok(Redirect::to("/client/edit?error=invalid_profile"))
        }
        Err(e) => Err(e.into()),
    }
}
