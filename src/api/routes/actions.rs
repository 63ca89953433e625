//! Action trace routes

use axum::{
    Router,
    routing::{get, post},
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{ActionsPage, VotersPage};
use crate::params::{self, RawPageParams};
use crate::service::HistoryService;

/// Body of the POST actions route. `pos` and `offset` arrive as loose
/// values since callers send both numbers and numeric strings.
#[derive(Debug, Default, Deserialize)]
struct ActionsBody {
    account_name: Option<String>,
    action_name: Option<String>,
    pos: Option<Value>,
    offset: Option<Value>,
}

pub fn routes(service: Arc<HistoryService>) -> Router {
    Router::new()
        .route("/get_actions", post(post_actions))
        .route("/get_actions/:account", get(get_account_actions))
        .route("/get_actions/:account/:action", get(get_account_actions_by_name))
        .route("/get_actions_unique/:account", get(get_unique_actions))
        .route("/get_contract_actions/:name", get(get_contract_actions))
        .route(
            "/get_contract_actions/:name/:action",
            get(get_contract_actions_by_name),
        )
        .route("/get_voters/:account", get(get_voters))
        .with_state(service)
}

#[axum::debug_handler]
async fn get_account_actions(
    State(service): State<Arc<HistoryService>>,
    Path(account): Path<String>,
    Query(raw): Query<RawPageParams>,
) -> Result<Json<ActionsPage>> {
    let page = params::validate_page(&raw, params::DEFAULT_LIMIT)?;
    Ok(Json(service.account_actions(Some(&account), None, page).await?))
}

#[axum::debug_handler]
async fn get_account_actions_by_name(
    State(service): State<Arc<HistoryService>>,
    Path((account, action)): Path<(String, String)>,
    Query(raw): Query<RawPageParams>,
) -> Result<Json<ActionsPage>> {
    let page = params::validate_page(&raw, params::DEFAULT_LIMIT)?;
    Ok(Json(
        service
            .account_actions(Some(&account), Some(&action), page)
            .await?,
    ))
}

/// Body variant of the account actions listing, using cursor-offset
/// addressing instead of skip/limit/sort.
#[axum::debug_handler]
async fn post_actions(
    State(service): State<Arc<HistoryService>>,
    body: Option<Json<ActionsBody>>,
) -> Result<Json<ActionsPage>> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let page = params::validate_position_page(
        params::numeric(body.pos.as_ref()),
        params::numeric(body.offset.as_ref()),
    )?;
    Ok(Json(
        service
            .account_actions(body.account_name.as_deref(), body.action_name.as_deref(), page)
            .await?,
    ))
}

#[axum::debug_handler]
async fn get_unique_actions(
    State(service): State<Arc<HistoryService>>,
    Path(account): Path<String>,
) -> Result<Json<Vec<Value>>> {
    Ok(Json(service.unique_action_names(&account).await?))
}

#[axum::debug_handler]
async fn get_contract_actions(
    State(service): State<Arc<HistoryService>>,
    Path(name): Path<String>,
    Query(raw): Query<RawPageParams>,
) -> Result<Json<ActionsPage>> {
    let page = params::validate_page(&raw, params::DEFAULT_LIMIT)?;
    Ok(Json(service.contract_actions(Some(&name), None, page).await?))
}

#[axum::debug_handler]
async fn get_contract_actions_by_name(
    State(service): State<Arc<HistoryService>>,
    Path((name, action)): Path<(String, String)>,
    Query(raw): Query<RawPageParams>,
) -> Result<Json<ActionsPage>> {
    let page = params::validate_page(&raw, params::DEFAULT_LIMIT)?;
    Ok(Json(
        service
            .contract_actions(Some(&name), Some(&action), page)
            .await?,
    ))
}

#[axum::debug_handler]
async fn get_voters(
    State(service): State<Arc<HistoryService>>,
    Path(account): Path<String>,
    Query(raw): Query<RawPageParams>,
) -> Result<Json<VotersPage>> {
    let page = params::validate_page(&raw, params::DEFAULT_VOTERS_LIMIT)?;
    Ok(Json(service.voters_page(&account, page).await?))
}
