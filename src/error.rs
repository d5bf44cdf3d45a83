use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Failure of a single CMS round-trip.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("GraphQL request failed: {status}")]
    Transport { status: reqwest::StatusCode },
    #[error("{message}")]
    Query { message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unexpected CMS response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    source: anyhow::Error,
}

impl AppError {
    pub fn bad_request(source: impl Into<anyhow::Error>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, source: source.into() }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.source.fmt(f)
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(source: anyhow::Error) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.source, "request failed");
        } else {
            tracing::warn!(status = %self.status, error = %self.source, "rejected request");
        }
        let body = crate::templates::error_page(self.to_string());
        (self.status, Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
