//! Authentication middleware and extractors.
//!
//! Resolves the session cookie to the current member. The session record holds
//! only the user id; the user row is loaded from the store on every request so
//! that deleted users and revoked admin flags take effect immediately.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use turnstile_core::UserId;

use crate::config::CatalogEditPolicy;
use crate::db::UserRepository;
use crate::models::{User, session_keys};
use crate::state::AppState;

/// Error returned when a request can't be attributed to a permitted user.
#[derive(Debug)]
pub enum AuthRejection {
    /// No session, or the session's user no longer exists.
    RedirectToLogin,
    /// The user is known but not allowed to do this.
    Forbidden,
    /// The user lookup itself failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
            Self::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Read the user id stored in the request's session, if any.
async fn session_user_id(parts: &Parts) -> Option<UserId> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<UserId>(session_keys::USER_ID)
        .await
        .ok()
        .flatten()
}

/// Load the session's user row. `Ok(None)` covers both "no session" and
/// "session points at a deleted user".
async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AuthRejection> {
    let Some(user_id) = session_user_id(parts).await else {
        return Ok(None);
    };

    UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user_id, "Failed to resolve session user");
            AuthRejection::Internal
        })
}

/// Extractor that requires a session whose user exists.
///
/// If the member is not logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)
            .await?
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that requires a session but does not load the user row.
///
/// The handler decides what a missing user means.
pub struct RequireSession(pub UserId);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user_id(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that optionally gets the current member.
///
/// Unlike `RequireUser`, this never rejects. A failed lookup is logged and
/// treated as anonymous.
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_user(parts, state).await.ok().flatten()))
    }
}

/// Extractor that enforces the configured [`CatalogEditPolicy`].
///
/// Under `Open` every request passes and no user is resolved. Under
/// `AdminOnly` a missing session redirects to `/login` and a non-admin user is
/// rejected with `403`.
pub struct CatalogEditor(pub Option<User>);

impl FromRequestParts<AppState> for CatalogEditor {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match state.config().catalog_edit_policy {
            CatalogEditPolicy::Open => Ok(Self(None)),
            CatalogEditPolicy::AdminOnly => {
                let user = resolve_user(parts, state)
                    .await?
                    .ok_or(AuthRejection::RedirectToLogin)?;
                if !user.is_admin {
                    tracing::warn!(user_id = %user.id, "Non-admin attempted catalog edit");
                    return Err(AuthRejection::Forbidden);
                }
                Ok(Self(Some(user)))
            }
        }
    }
}

/// Helper to store the logged-in user in the session.
///
/// The session id is cycled first so a pre-login id can't be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user_id: UserId,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::USER_ID, user_id).await
}

/// Helper to destroy the session (logout).
///
/// # Errors
///
/// Returns an error if the session record cannot be deleted.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
