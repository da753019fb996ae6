use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use campus_core::dates::normalize_field;
use campus_types::api::{AuthenView, NewReview, ReviewForm};
use campus_types::models::{Identity, Professor};

use crate::error::{AppError, form_error};
use crate::routes::{AppState, login_redirect};

#[derive(Debug, Default, Deserialize)]
pub struct ProfessorQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Serialize)]
pub struct ProfessorListView {
    pub authen: AuthenView,
    pub professors: Vec<Professor>,
    pub query: String,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ProfessorQuery>,
) -> Json<ProfessorListView> {
    let professors = state
        .upstream
        .search_professors(identity.bearer(), &query.query)
        .await
        .unwrap_or_else(|e| {
            warn!("professors unavailable, showing none: {}", e);
            Vec::new()
        });

    Json(ProfessorListView {
        authen: AuthenView::from(&identity),
        professors,
        query: query.query,
    })
}

#[derive(Serialize)]
pub struct ProfessorView {
    pub authen: AuthenView,
    pub professor: Professor,
}

pub async fn detail(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(mut professor) = state.upstream.professor(id, identity.bearer()).await? else {
        return Ok(Redirect::to("/professors").into_response());
    };
    for review in &mut professor.reviews {
        normalize_field(&mut review.created_at);
    }

    Ok(Json(ProfessorView {
        authen: AuthenView::from(&identity),
        professor,
    })
    .into_response())
}

pub async fn review(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Form(form): Form<ReviewForm>,
) -> Result<Response, AppError> {
    if !identity.is_authenticated() {
        return Ok(login_redirect());
    }

    let review = NewReview {
        author: identity.email.as_deref().unwrap_or_default(),
        rating: form.rating.trim(),
        comment: form.comment.trim(),
        creator_id: identity.user_id,
    };
    if state
        .upstream
        .create_review(id, identity.bearer(), &review)
        .await?
    {
        info!(professor_id = id, "review added");
        Ok(Redirect::to(&format!("/professors/{id}")).into_response())
    } else {
        Ok(form_error(
            StatusCode::BAD_REQUEST,
            json!("Your review could not be saved."),
        ))
    }
}
