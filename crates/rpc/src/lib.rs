//! JSON-RPC transport for Bitcoin/Elements style nodes.
//!
//! [`RpcClient`] turns a method name plus positional parameters into a
//! single authenticated HTTP POST, retrying only while the node cannot be
//! reached, and folds the `{result, error}` envelope into a [`RpcResult`].
//! Endpoints on onion hosts are routed through a local SOCKS5 proxy.

pub mod client;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod methods;
pub mod types;

pub use client::{RpcClient, RpcConfig};
pub use endpoint::{Endpoint, RoutingPolicy, DEFAULT_SOCKS5_PROXY};
pub use envelope::{Request, Response, JSONRPC_VERSION};
pub use error::{ErrorKind, RpcError, RpcResult};
pub use types::{AddressValidation, BlockchainInfo, FundedTransaction, MempoolAcceptResult, MempoolInfo, SignedTransaction};
