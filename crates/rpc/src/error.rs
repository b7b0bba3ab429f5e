//! Error types for node RPC calls

use serde_json::Value;
use thiserror::Error;

/// Which side of the wire a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The node could not be reached or answered with something other than an envelope
    Transport,
    /// The node answered and reported an application error
    Semantic,
}

/// RPC client errors
///
/// Every variant is terminal: the only failures retried by the client are
/// connection failures (refused, proxy unreachable, or dropped before an
/// answer), and those surface here only once the retry budget is spent.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Failed to connect for remote procedure call after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("RPC connection failure: {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("RPC request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("Error in RPC call: {0}")]
    Node(Value),

    /// Bad endpoint URL, proxy address or client settings at construction
    #[error("Invalid RPC endpoint: {0}")]
    Endpoint(String),
}

impl RpcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RpcError::Node(_) => ErrorKind::Semantic,
            _ => ErrorKind::Transport,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_semantic(&self) -> bool {
        self.kind() == ErrorKind::Semantic
    }

    /// The node-supplied error payload, for semantic errors.
    pub fn node_error(&self) -> Option<&Value> {
        match self {
            RpcError::Node(payload) => Some(payload),
            _ => None,
        }
    }

    /// Numeric `code` of a Bitcoin-style `{code, message}` error payload.
    pub fn node_code(&self) -> Option<i64> {
        self.node_error()?.get("code")?.as_i64()
    }
}

pub type RpcResult<T> = Result<T, RpcError>;
