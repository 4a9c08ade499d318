//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use super::NavUser;
use crate::middleware::OptionalUser;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub current_user: Option<NavUser>,
}

/// Display the landing page.
pub async fn home(OptionalUser(user): OptionalUser) -> impl IntoResponse {
    HomeTemplate {
        current_user: user.as_ref().map(NavUser::from),
    }
}
