pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod discussions;
pub mod events;
pub mod professors;

use std::sync::Arc;

use axum::{
    Router, middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use campus_upstream::HttpUpstream;

use crate::session::load_identity;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub upstream: HttpUpstream,
    pub session_secret: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(auth::index))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/myworkplace", get(dashboard::myworkplace))
        .route("/events", get(events::list).post(events::create))
        .route("/events/{id}", get(events::detail).post(events::update))
        .route("/events/{id}/edit", get(events::edit_form))
        .route("/events/{id}/delete", post(events::remove))
        .route("/discussions", get(discussions::list).post(discussions::create))
        .route("/discussions/{id}", get(discussions::detail))
        .route("/discussions/{id}/delete", post(discussions::remove))
        .route("/discussions/{id}/comments", post(discussions::comment))
        .route("/courses", get(courses::list))
        .route("/professors", get(professors::list))
        .route("/professors/{id}", get(professors::detail))
        .route("/professors/{id}/reviews", post(professors::review))
        .layer(middleware::from_fn_with_state(state.clone(), load_identity))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) fn login_redirect() -> Response {
    Redirect::to("/login").into_response()
}

/// Page numbers arrive as free text; anything unreadable means the first page.
pub(crate) fn page_number(raw: Option<&str>) -> usize {
    raw.and_then(|p| p.trim().parse().ok()).unwrap_or(1)
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn number(&self) -> usize {
        page_number(self.page.as_deref())
    }
}
