//! Faucet configuration

use liquid_common::{load_config, LoggingConfig};
use liquid_rpc::{Endpoint, RpcConfig, RpcResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Asset id of the issued test asset on Liquid testnet
pub const DEFAULT_TEST_ASSET: &str = "38fca2d939696061a8f76d4e6b5eecd54e3b4221c846f24a6b279e79952850a5";

/// Node connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Wallet name; empty uses the node's default wallet
    pub wallet: String,
    /// Wallet passphrase; empty means the wallet is not encrypted
    pub passphrase: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7041,
            username: "user".to_string(),
            password: "pass".to_string(),
            wallet: String::new(),
            passphrase: String::new(),
        }
    }
}

impl NodeConfig {
    pub fn endpoint(&self) -> RpcResult<Endpoint> {
        Endpoint::from_parts(&self.host, self.port, &self.username, &self.password, &self.wallet)
    }
}

/// Faucet service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaucetConfig {
    /// Server address
    pub server_addr: String,

    /// Enable CORS
    pub cors_enabled: bool,

    pub node: NodeConfig,

    /// Retry, proxy and timeout settings for node calls
    pub rpc: RpcConfig,

    /// Policy asset sent per `lbtc` request
    pub lbtc_amount: f64,

    /// Test asset sent per `test` request
    pub test_amount: f64,

    pub test_asset_id: String,

    /// Multiplier applied to the test asset balance for display
    pub test_balance_scale: f64,

    /// Blocks per explorer page
    pub explorer_page_size: u64,

    /// How long `walletpassphrase` keeps the wallet unlocked at startup (seconds)
    pub unlock_timeout_secs: u64,

    pub logging: LoggingConfig,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:8123".to_string(),
            cors_enabled: true,
            node: NodeConfig::default(),
            rpc: RpcConfig::default(),
            lbtc_amount: 0.001,
            test_amount: 0.00005,
            test_asset_id: DEFAULT_TEST_ASSET.to_string(),
            test_balance_scale: 100_000.0,
            explorer_page_size: 120,
            unlock_timeout_secs: 60,
            logging: LoggingConfig::default(),
        }
    }
}

impl FaucetConfig {
    /// Load from `path` when given, then apply `FAUCET_*` environment overrides
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => load_config(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a `FAUCET_*` key lookup. Unparseable numbers keep
    /// the current value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("FAUCET_SERVER_ADDR") {
            self.server_addr = addr;
        }

        if let Some(host) = lookup("FAUCET_NODE_HOST") {
            self.node.host = host;
        }

        if let Some(port) = lookup("FAUCET_NODE_PORT") {
            self.node.port = port.parse().unwrap_or(self.node.port);
        }

        if let Some(user) = lookup("FAUCET_NODE_USERNAME") {
            self.node.username = user;
        }

        if let Some(password) = lookup("FAUCET_NODE_PASSWORD") {
            self.node.password = password;
        }

        if let Some(wallet) = lookup("FAUCET_NODE_WALLET") {
            self.node.wallet = wallet;
        }

        if let Some(passphrase) = lookup("FAUCET_NODE_PASSPHRASE") {
            self.node.passphrase = passphrase;
        }

        if let Some(proxy) = lookup("FAUCET_SOCKS5_PROXY") {
            self.rpc.proxy_addr = proxy;
        }

        if let Some(asset) = lookup("FAUCET_TEST_ASSET_ID") {
            self.test_asset_id = asset;
        }

        if let Some(enabled) = lookup("FAUCET_CORS_ENABLED") {
            self.cors_enabled = enabled.to_lowercase() == "true";
        }

        if let Some(level) = lookup("FAUCET_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}
