//! Liquid testnet faucet and micro-explorer
//!
//! A JSON HTTP front end over a Liquid node:
//! - Chain and mempool statistics
//! - Block and transaction lookups
//! - Policy-asset and test-asset faucet
//! - Mempool acceptance checks and broadcasting

pub mod api;
pub mod config;
pub mod error;
pub mod service;

pub use config::{FaucetConfig, NodeConfig};
pub use error::{FaucetError, FaucetResult};
pub use service::{Balances, BlockRow, DispenseResponse, ExplorerPage, FaucetAsset, FaucetService, NodeStats};
