//! Faucet and explorer logic over the node RPC client

use super::config::FaucetConfig;
use super::error::{FaucetError, FaucetResult};
use liquid_rpc::{MempoolAcceptResult, RpcClient};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Chain and mempool summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStats {
    pub chain: String,
    pub blocks: u64,
    pub height: u64,
    pub mempool: String,
    pub space: String,
}

/// One explorer row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRow {
    pub id: u64,
    pub hash: String,
    pub size: u64,
    pub time: u64,
    #[serde(rename = "nTx")]
    pub n_tx: u64,
}

/// A page of blocks, newest first, with cursors for the neighbouring pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerPage {
    pub blocks: Vec<BlockRow>,
    pub prev: i64,
    pub next: i64,
}

/// Faucet wallet balances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub balance: f64,
    pub balance_test: f64,
}

/// Faucet request outcome. Exactly one of the result fields is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispenseResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_test: Option<String>,
    #[serde(flatten)]
    pub balances: Balances,
}

/// Asset the faucet can hand out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaucetAsset {
    /// Liquid bitcoin, the policy asset
    Lbtc,
    /// The configured issued test asset
    Test,
}

impl FaucetAsset {
    pub fn from_action(action: &str) -> FaucetResult<Self> {
        match action {
            "lbtc" => Ok(FaucetAsset::Lbtc),
            "test" => Ok(FaucetAsset::Test),
            other => Err(FaucetError::InvalidAction(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FaucetAsset::Lbtc => "LBTC",
            FaucetAsset::Test => "TEST",
        }
    }
}

/// Faucet service
pub struct FaucetService {
    config: FaucetConfig,
    rpc: Arc<RpcClient>,
}

impl FaucetService {
    pub fn new(config: FaucetConfig, rpc: Arc<RpcClient>) -> Self {
        Self { config, rpc }
    }

    /// Unlock the wallet when a passphrase is configured
    pub async fn unlock_wallet(&self) -> FaucetResult<()> {
        if self.config.node.passphrase.is_empty() {
            return Ok(());
        }

        self.rpc
            .wallet_passphrase(&self.config.node.passphrase, self.config.unlock_timeout_secs)
            .await?;
        info!("Wallet unlocked for {}s", self.config.unlock_timeout_secs);
        Ok(())
    }

    /// Chain and mempool summary
    pub async fn stats(&self) -> FaucetResult<NodeStats> {
        let info = self.rpc.get_blockchain_info().await?;
        let mempool = self.rpc.get_mempool_info().await?;

        Ok(NodeStats {
            chain: info.chain,
            blocks: info.blocks,
            height: info.headers,
            mempool: format!("{} tx ({:.3} MB)", mempool.size, mempool.bytes as f64 / BYTES_PER_MB),
            space: format!("{:.3} MB", info.size_on_disk as f64 / BYTES_PER_MB),
        })
    }

    /// Blocks from `start` (default and cap: the tip) down to, but not
    /// including, `start - page_size` (floored at 0).
    pub async fn explorer(&self, start: Option<&str>) -> FaucetResult<ExplorerPage> {
        let tip = self.rpc.get_block_count().await?;
        let start = start
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map_or(tip, |s| s.min(tip));
        let elements = self.config.explorer_page_size;
        let last = start.saturating_sub(elements);

        let mut blocks = Vec::with_capacity((start - last) as usize);
        for height in ((last + 1)..=start).rev() {
            let hash = self.rpc.get_block_hash(height).await?;
            let block = self.rpc.get_block(&hash, 1).await?;
            blocks.push(BlockRow {
                id: height,
                size: block["size"].as_u64().unwrap_or_default(),
                time: block["time"].as_u64().unwrap_or_default(),
                n_tx: block["nTx"].as_u64().unwrap_or_default(),
                hash,
            });
        }

        debug!("Explorer page {}..{} ({} blocks)", start, last, blocks.len());

        Ok(ExplorerPage {
            blocks,
            prev: start as i64 - elements as i64,
            next: start as i64 + elements as i64,
        })
    }

    /// Full block at `height`, or an `{"error": ...}` object
    pub async fn block(&self, height: Option<&str>) -> Value {
        let Some(height) = height else {
            return json!({"error": "missing height"});
        };
        let Ok(height) = height.trim().parse::<u64>() else {
            return json!({"error": "invalid height"});
        };

        match self.full_block_at(height).await {
            Ok(block) => block,
            Err(e) => {
                warn!("Block lookup at height {} failed: {}", height, e);
                json!({"error": "unknown block"})
            }
        }
    }

    async fn full_block_at(&self, height: u64) -> liquid_rpc::RpcResult<Value> {
        let hash = self.rpc.get_block_hash(height).await?;
        self.rpc.get_block(&hash, 2).await
    }

    /// Decoded transaction, or an `{"error": ...}` object
    pub async fn transaction(&self, txid: Option<&str>) -> Value {
        let Some(txid) = txid else {
            return json!({"error": "missing txid"});
        };
        if txid.len() != 64 {
            return json!({"error": "txid must be of length 64"});
        }

        match self.rpc.get_raw_transaction(txid, true).await {
            Ok(tx) => tx,
            Err(e) => {
                warn!("Transaction lookup {} failed: {}", txid, e);
                json!({"error": "unknown txid"})
            }
        }
    }

    /// Current faucet balances; assets the wallet does not hold count as zero
    pub async fn balances(&self) -> FaucetResult<Balances> {
        let balance = self.rpc.get_balance().await?;

        Ok(Balances {
            balance: balance.get("bitcoin").copied().unwrap_or_default(),
            balance_test: balance.get(&self.config.test_asset_id).copied().unwrap_or_default()
                * self.config.test_balance_scale,
        })
    }

    /// Handle a faucet request for `action` (`lbtc` or `test`)
    pub async fn dispense(&self, address: Option<&str>, action: Option<&str>) -> FaucetResult<DispenseResponse> {
        let balances = self.balances().await?;

        let Some(address) = address else {
            return Ok(DispenseResponse {
                result: Some("missing address".to_string()),
                result_test: None,
                balances,
            });
        };

        let asset = FaucetAsset::from_action(action.unwrap_or_default())?;
        let message = self.send(address, asset).await?;

        Ok(match asset {
            FaucetAsset::Lbtc => DispenseResponse {
                result: Some(message),
                result_test: None,
                balances,
            },
            FaucetAsset::Test => DispenseResponse {
                result: None,
                result_test: Some(message),
                balances,
            },
        })
    }

    /// Validate `address` and send the configured amount of `asset`.
    ///
    /// An address the node rejects yields the message `Error`.
    pub async fn send(&self, address: &str, asset: FaucetAsset) -> FaucetResult<String> {
        if !self.rpc.validate_address(address).await?.isvalid {
            warn!("Rejected faucet request for invalid address {}", address);
            return Ok("Error".to_string());
        }

        let (amount, txid) = match asset {
            FaucetAsset::Lbtc => {
                let amount = self.config.lbtc_amount;
                (amount, self.rpc.send_to_address(address, amount).await?)
            }
            FaucetAsset::Test => {
                let amount = self.config.test_amount;
                let txid = self
                    .rpc
                    .send_asset_to_address(address, amount, &self.config.test_asset_id)
                    .await?;
                (amount, txid)
            }
        };

        info!("Sent {} {} to {} in {}", amount, asset.label(), address, txid);
        Ok(format!(
            "Sent {} {} to address {} with transaction {}.",
            amount,
            asset.label(),
            address,
            txid
        ))
    }

    /// Mempool acceptance check for a raw transaction
    pub async fn test_transaction(&self, hex: &str) -> FaucetResult<Vec<MempoolAcceptResult>> {
        Ok(self.rpc.test_mempool_accept(hex).await?)
    }

    /// Relay `hex` only if the mempool would accept it. `None` when rejected.
    pub async fn broadcast(&self, hex: &str) -> FaucetResult<Option<String>> {
        let verdict = self.rpc.test_mempool_accept(hex).await?;
        let allowed = verdict.first().map(|r| r.allowed).unwrap_or(false);

        if !allowed {
            let reason = verdict.first().and_then(|r| r.reject_reason.as_deref()).unwrap_or("unknown");
            warn!("Not broadcasting rejected transaction: {}", reason);
            return Ok(None);
        }

        let txid = self.rpc.send_raw_transaction(hex).await?;
        info!("Broadcast transaction {}", txid);
        Ok(Some(txid))
    }

    /// Build, fund, blind, sign and relay a transaction carrying `data`
    /// (hex) in an OP_RETURN output. `None` when the mempool rejects it.
    pub async fn op_return(&self, data: &str) -> FaucetResult<Option<String>> {
        let base = self
            .rpc
            .create_raw_transaction(json!([]), json!([{ "data": data }]))
            .await?;
        let funded = self.rpc.fund_raw_transaction(&base).await?;
        let blinded = self.rpc.blind_raw_transaction(&funded.hex).await?;
        let signed = self.rpc.sign_raw_transaction_with_wallet(&blinded).await?;

        if !signed.complete {
            return Err(FaucetError::InternalError("wallet could not sign the transaction".to_string()));
        }

        self.broadcast(&signed.hex).await
    }

    /// Dispatch a utils command. Unknown or absent commands yield `{}`.
    pub async fn utils(&self, command: Option<&str>, tx: Option<&str>, text: Option<&str>) -> FaucetResult<Value> {
        let required = |value: Option<&str>, name: &str| {
            value
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| FaucetError::InvalidRequest(format!("missing {}", name)))
        };

        Ok(match command {
            Some("test") => json!({ "result_test": self.test_transaction(&required(tx, "tx")?).await? }),
            Some("broadcast") => json!({ "result_broadcast": self.broadcast(&required(tx, "tx")?).await? }),
            Some("opreturn") => json!({ "result_opreturn": self.op_return(&required(text, "text")?).await? }),
            _ => json!({}),
        })
    }
}
