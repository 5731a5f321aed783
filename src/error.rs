//! Application error type and response formatting.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// Body served for any missing page or object.
pub const NOT_FOUND_BODY: &str = "<h3>Not found</h3>";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing object lookup or unmatched route.
    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("malformed form submission: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("html rewrite error: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::NotFound => (StatusCode::NOT_FOUND, Html(NOT_FOUND_BODY)).into_response(),
            Self::Multipart(err) => {
                tracing::debug!(error = %err, "rejected form submission");
                (StatusCode::BAD_REQUEST, Html("<h3>Bad request</h3>")).into_response()
            }
            err => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h3>Something went wrong</h3>"),
                )
                    .into_response()
            }
        }
    }
}
