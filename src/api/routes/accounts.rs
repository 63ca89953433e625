//! Account and key index routes

use axum::{
    Router,
    routing::{get, post},
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{HistoryError, Result};
use crate::models::{AccountSummary, AccountsPage, ContractSummary};
use crate::params;
use crate::service::HistoryService;

#[derive(Debug, Default, Deserialize)]
struct AccountsQuery {
    account: Option<String>,
    skip: Option<String>,
    limit: Option<String>,
    counter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ControlledBody {
    controlling_account: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyBody {
    public_key: Option<String>,
}

pub fn routes(service: Arc<HistoryService>) -> Router {
    Router::new()
        .route("/get_accounts", get(get_accounts))
        .route("/get_account/:name", get(get_account))
        .route("/get_contract/:name", get(get_contract))
        .route("/get_controlled_accounts", post(post_controlled_accounts))
        .route(
            "/get_controlled_accounts/:controlling_account",
            get(get_controlled_accounts),
        )
        .route("/get_key_accounts", post(post_key_accounts))
        .route("/get_key_accounts/:public_key", get(get_key_accounts))
        .with_state(service)
}

#[axum::debug_handler]
async fn get_accounts(
    State(service): State<Arc<HistoryService>>,
    Query(query): Query<AccountsQuery>,
) -> Result<Json<AccountsPage>> {
    let (skip, limit) = params::validate_accounts_page(query.skip.as_deref(), query.limit.as_deref())?;
    let include_total = query.counter.as_deref() == Some("on");
    Ok(Json(
        service
            .accounts_page(query.account.as_deref(), skip, limit, include_total)
            .await?,
    ))
}

#[axum::debug_handler]
async fn get_account(
    State(service): State<Arc<HistoryService>>,
    Path(name): Path<String>,
) -> Result<Json<AccountSummary>> {
    Ok(Json(service.account_summary(&name).await?))
}

#[axum::debug_handler]
async fn get_contract(
    State(service): State<Arc<HistoryService>>,
    Path(name): Path<String>,
) -> Result<Json<ContractSummary>> {
    Ok(Json(service.contract_summary(&name).await?))
}

#[axum::debug_handler]
async fn get_controlled_accounts(
    State(service): State<Arc<HistoryService>>,
    Path(controlling_account): Path<String>,
) -> Result<Json<Vec<Value>>> {
    Ok(Json(service.controlled_accounts(&controlling_account).await?))
}

#[axum::debug_handler]
async fn post_controlled_accounts(
    State(service): State<Arc<HistoryService>>,
    body: Option<Json<ControlledBody>>,
) -> Result<Json<Vec<Value>>> {
    let controlling_account = body
        .and_then(|Json(body)| body.controlling_account)
        .ok_or(HistoryError::MissingKey)?;
    Ok(Json(service.controlled_accounts(&controlling_account).await?))
}

#[axum::debug_handler]
async fn get_key_accounts(
    State(service): State<Arc<HistoryService>>,
    Path(public_key): Path<String>,
) -> Result<Json<Vec<Value>>> {
    Ok(Json(service.key_accounts(&public_key).await?))
}

#[axum::debug_handler]
async fn post_key_accounts(
    State(service): State<Arc<HistoryService>>,
    body: Option<Json<KeyBody>>,
) -> Result<Json<Vec<Value>>> {
    let public_key = body
        .and_then(|Json(body)| body.public_key)
        .ok_or(HistoryError::MissingKey)?;
    Ok(Json(service.key_accounts(&public_key).await?))
}
