//! HTTP API for faucet service

use super::error::FaucetResult;
use super::service::{DispenseResponse, ExplorerPage, FaucetService, NodeStats};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Default, Deserialize)]
pub struct ExplorerQuery {
    pub start: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlockQuery {
    pub height: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub txid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FaucetQuery {
    pub address: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UtilsQuery {
    pub command: Option<String>,
    pub tx: Option<String>,
    pub text: Option<String>,
}

/// All routes, sharing one service
pub fn router(service: Arc<FaucetService>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/about", get(about_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/explorer", get(explorer_handler))
        .route("/api/block", get(block_handler))
        .route("/api/transaction", get(transaction_handler))
        .route("/api/faucet", get(faucet_handler))
        .route("/api/utils", get(utils_handler))
        .with_state(service)
}

/// Stats handler
pub async fn stats_handler(State(service): State<Arc<FaucetService>>) -> FaucetResult<Json<NodeStats>> {
    Ok(Json(service.stats().await?))
}

/// Explorer handler
pub async fn explorer_handler(
    State(service): State<Arc<FaucetService>>,
    Query(query): Query<ExplorerQuery>,
) -> FaucetResult<Json<ExplorerPage>> {
    Ok(Json(service.explorer(query.start.as_deref()).await?))
}

pub async fn block_handler(
    State(service): State<Arc<FaucetService>>,
    Query(query): Query<BlockQuery>,
) -> Json<Value> {
    Json(service.block(query.height.as_deref()).await)
}

pub async fn transaction_handler(
    State(service): State<Arc<FaucetService>>,
    Query(query): Query<TransactionQuery>,
) -> Json<Value> {
    Json(service.transaction(query.txid.as_deref()).await)
}

/// Faucet handler
pub async fn faucet_handler(
    State(service): State<Arc<FaucetService>>,
    Query(query): Query<FaucetQuery>,
) -> FaucetResult<Json<DispenseResponse>> {
    info!(
        "Faucet request: address={:?} action={:?}",
        query.address, query.action
    );

    match service
        .dispense(query.address.as_deref(), query.action.as_deref())
        .await
    {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Faucet error: {}", e);
            Err(e)
        }
    }
}

/// Utils handler (`test`, `broadcast`, `opreturn`)
pub async fn utils_handler(
    State(service): State<Arc<FaucetService>>,
    Query(query): Query<UtilsQuery>,
) -> FaucetResult<Json<Value>> {
    let result = service
        .utils(query.command.as_deref(), query.tx.as_deref(), query.text.as_deref())
        .await;

    if let Err(e) = &result {
        error!("Utils command {:?} failed: {}", query.command, e);
    }
    Ok(Json(result?))
}

pub async fn about_handler() -> impl IntoResponse {
    Json(serde_json::json!({}))
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Root handler with info
pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Liquid Faucet",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Faucet and block explorer for a Liquid node",
        "endpoints": {
            "GET /api/stats": "Chain and mempool statistics",
            "GET /api/explorer?start=": "Latest blocks, newest first",
            "GET /api/block?height=": "Block at height",
            "GET /api/transaction?txid=": "Decoded transaction",
            "GET /api/faucet?address=&action=lbtc|test": "Request funds",
            "GET /api/utils?command=test|broadcast&tx=": "Check or relay a raw transaction",
            "GET /api/utils?command=opreturn&text=": "Publish hex data in an OP_RETURN output",
            "GET /health": "Health check"
        }
    }))
}
