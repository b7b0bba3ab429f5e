//! Error types for the faucet service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use liquid_rpc::{ErrorKind, RpcError};
use serde_json::json;
use thiserror::Error;

/// Faucet service errors
#[derive(Error, Debug)]
pub enum FaucetError {
    #[error("Node RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for FaucetError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            FaucetError::Rpc(err) => match err.kind() {
                ErrorKind::Semantic => (StatusCode::BAD_GATEWAY, "NODE_ERROR"),
                ErrorKind::Transport => (StatusCode::SERVICE_UNAVAILABLE, "NODE_UNAVAILABLE"),
            },
            FaucetError::InvalidAction(_) => (StatusCode::BAD_REQUEST, "INVALID_ACTION"),
            FaucetError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            FaucetError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(json!({
            "error": error_code,
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));

        (status, body).into_response()
    }
}

pub type FaucetResult<T> = Result<T, FaucetError>;
