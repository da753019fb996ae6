use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::error;

use campus_types::api::ErrorBody;
use campus_upstream::FetchError;

/// Failures that end a request with a generic error page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("upstream call failed: {0}")]
    Upstream(#[from] FetchError),

    #[error("not found")]
    NotFound,

    #[error("session could not be issued: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Upstream(e) => {
                error!("{}", e);
                (StatusCode::BAD_GATEWAY, "Upstream service error.")
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found."),
            AppError::Session(e) => {
                error!("{}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error.")
            }
        };
        form_error(status, json!(message))
    }
}

/// A user-facing error the page can display next to the form that caused it.
pub fn form_error(status: StatusCode, error: Value) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}
