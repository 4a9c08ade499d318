//! Authentication route handlers.
//!
//! Handles registration, username/password login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireSession, clear_current_user, set_current_user};
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub name: String,
    pub gender: String,
    pub age: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<super::NavUser>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<super::NavUser>,
    pub error: Option<&'static str>,
}

/// Human-readable message for a registration `?error=` code.
fn register_error_message(code: &str) -> &'static str {
    match code {
        "username_taken" => "That username is already taken.",
        "invalid_username" => "Usernames must be 1 to 64 characters with no spaces.",
        "weak_password" => "Passwords must be at least 8 characters.",
        "invalid_profile" => "Please fill in your name, gender and a valid age.",
        _ => "Registration failed. Please try again.",
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { current_user: None }
}

/// Handle login form submission.
///
/// Any failure redirects back to `/login` without touching the session, so no
/// cookie is issued.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(username = %form.username, "Login failed");
            return Ok(Redirect::to("/login").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    set_current_user(&session, user.id).await.map_err(|e| {
        AppError::Internal(format!("failed to store session: {e}"))
    })?;
    set_sentry_user(&user.id, Some(user.username.as_str()));

    tracing::info!(user_id = %user.id, "Member logged in");
    Ok(Redirect::to("/menu").into_response())
}

/// Destroy the session and return to the landing page.
pub async fn logout(
    RequireSession(user_id): RequireSession,
    session: Session,
) -> Result<Redirect, AppError> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;
    clear_sentry_user();

    tracing::info!(user_id = %user_id, "Member logged out");
    Ok(Redirect::to("/"))
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        current_user: None,
        error: query.error.as_deref().map(register_error_message),
    }
}

/// Handle registration form submission.
///
/// The new member is not logged in; they are sent to the landing page.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    let registration = Registration {
        username: &form.username,
        password: &form.password,
        name: &form.name,
        gender: &form.gender,
        age: &form.age,
    };

    match AuthService::new(state.pool()).register(registration).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "Member registered");
            Ok(Redirect::to("/"))
        }
        Err(e @ (AuthError::Repository(_) | AuthError::PasswordHash)) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Registration rejected");
            Ok(Redirect::to(&format!("/register?error={}", e.form_code())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_error_messages() {
        assert_eq!(
            register_error_message("username_taken"),
            "That username is already taken."
        );
        assert_eq!(
            register_error_message("<script>"),
            "Registration failed. Please try again."
        );
    }
}
