//! API server implementation

use axum::{
    Router,
    http::Method,
};
use tower_http::cors::{CorsLayer, Any};
use std::sync::Arc;

use crate::api::{docs, routes};
use crate::error::{HistoryError, Result};
use crate::service::HistoryService;

pub struct ApiServer {
    service: Arc<HistoryService>,
    bind_address: String,
    port: u16,
}

impl ApiServer {
    pub fn new(service: Arc<HistoryService>, bind_address: String, port: u16) -> Self {
        Self {
            service,
            bind_address,
            port,
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);

        Router::new()
            .merge(docs::routes())
            .nest("/v1/history", Router::new()
                .merge(routes::blocks::routes(self.service.clone()))
                .merge(routes::transactions::routes(self.service.clone()))
                .merge(routes::actions::routes(self.service.clone()))
                .merge(routes::accounts::routes(self.service.clone()))
            )
            .layer(cors)
    }

    pub async fn start(&self) -> Result<()> {
        let app = self.router();
        let addr = format!("{}:{}", self.bind_address, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await
            .map_err(|e| HistoryError::Internal(format!("Failed to bind: {}", e)))?;

        tracing::info!("API server listening on {}", addr);

        axum::serve(listener, app).await
            .map_err(|e| HistoryError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}
