//! Transaction-related routes

use axum::{
    Router,
    routing::{get, post},
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{HistoryError, Result};
use crate::models::TransactionsPage;
use crate::service::HistoryService;

#[derive(Debug, Default, Deserialize)]
struct TransactionBody {
    id: Option<String>,
}

pub fn routes(service: Arc<HistoryService>) -> Router {
    Router::new()
        .route("/get_transactions", get(get_transactions))
        .route("/get_transaction", post(post_transaction))
        .route("/get_transaction/:id", get(get_transaction))
        .with_state(service)
}

#[axum::debug_handler]
async fn get_transactions(
    State(service): State<Arc<HistoryService>>,
) -> Result<Json<TransactionsPage>> {
    Ok(Json(service.recent_transactions().await?))
}

#[axum::debug_handler]
async fn get_transaction(
    State(service): State<Arc<HistoryService>>,
    Path(id): Path<String>,
) -> Result<Json<Option<Value>>> {
    Ok(Json(service.transaction_trace(&id).await?))
}

/// Body variant of the transaction lookup. A missing or malformed body is
/// rejected the same way as a missing id.
#[axum::debug_handler]
async fn post_transaction(
    State(service): State<Arc<HistoryService>>,
    body: Option<Json<TransactionBody>>,
) -> Result<Json<Option<Value>>> {
    let id = body
        .and_then(|Json(body)| body.id)
        .ok_or(HistoryError::MissingKey)?;
    Ok(Json(service.transaction_trace(&id).await?))
}
