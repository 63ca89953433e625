//! Error types for the history API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by route handlers.
///
/// Validation variants keep the historical plain-text messages and map to
/// HTTP 401; store failures map to HTTP 500 with an empty body.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Max elements {0}!")]
    PageTooLarge(u64),

    #[error("Max limit accounts per query = {0}")]
    AccountPageTooLarge(u64),

    #[error("Skip ({skip}) || ({limit}) limit < 0")]
    NegativePage { skip: i64, limit: i64 },

    #[error("Sort param must be 1 or -1")]
    InvalidSort,

    #[error("Wrong transactions ID!")]
    MissingKey,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

impl IntoResponse for HistoryError {
    fn into_response(self) -> Response {
        match self {
            HistoryError::Store(err) => {
                tracing::error!("store failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            HistoryError::Internal(err) => {
                tracing::error!("internal failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            validation => (StatusCode::UNAUTHORIZED, validation.to_string()).into_response(),
        }
    }
}
