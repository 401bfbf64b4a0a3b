use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use mesopotamia_infra::PersistenceError;

use super::views;

/// Failures a page handler can end with. Each renders as an HTML page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] PersistenceError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::BadRequest(reason) => {
                tracing::debug!(%reason, "rejecting malformed request");
                html_error(StatusCode::BAD_REQUEST)
            }
            PageError::Forbidden(reason) => {
                tracing::warn!(reason, "request forbidden");
                html_error(StatusCode::FORBIDDEN)
            }
            PageError::NotFound => html_error(StatusCode::NOT_FOUND),
            PageError::Internal(e) => {
                tracing::error!(error = %e, error.debug = ?e, "page data could not be loaded");
                (StatusCode::INTERNAL_SERVER_ERROR, views::generic_error()).into_response()
            }
        }
    }
}

/// The HTML error page for `status`.
pub fn html_error(status: StatusCode) -> Response {
    (status, views::error_page(status)).into_response()
}

/// Fallback for paths no route matches.
pub async fn not_found() -> PageError {
    PageError::NotFound
}
