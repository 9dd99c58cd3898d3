// src/server/error.rs
// =============================================================================
// Request failures and the status codes they answer with:
// - bad or missing query parameters -> 400
// - crawl or render failures        -> 500
// The body is the error message as plain text.
// =============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::{CrawlError, RenderError};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0} param not provided")]
    MissingParam(&'static str),

    #[error("maxDepth param must be a positive integer")]
    InvalidDepth,

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match self {
            ServerError::MissingParam(_) | ServerError::InvalidDepth => StatusCode::BAD_REQUEST,
            ServerError::Crawl(_) | ServerError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
