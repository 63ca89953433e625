//! Block-related routes

use axum::{Router, routing::get, extract::State, Json};
use std::sync::Arc;

use crate::error::Result;
use crate::models::BlocksPage;
use crate::service::HistoryService;

pub fn routes(service: Arc<HistoryService>) -> Router {
    Router::new()
        .route("/get_blocks", get(get_blocks))
        // /statistics is a historical alias for the same listing
        .route("/statistics", get(get_blocks))
        .with_state(service)
}

#[axum::debug_handler]
async fn get_blocks(State(service): State<Arc<HistoryService>>) -> Result<Json<BlocksPage>> {
    Ok(Json(service.recent_blocks().await?))
}
