//! Typed wrappers for the node methods used by the faucet and explorer

use crate::client::RpcClient;
use crate::error::RpcResult;
use crate::types::{AddressValidation, BlockchainInfo, FundedTransaction, MempoolAcceptResult, MempoolInfo, SignedTransaction};
use serde_json::{json, Value};
use std::collections::HashMap;

impl RpcClient {
    pub async fn get_blockchain_info(&self) -> RpcResult<BlockchainInfo> {
        self.call_as("getblockchaininfo", vec![]).await
    }

    pub async fn get_mempool_info(&self) -> RpcResult<MempoolInfo> {
        self.call_as("getmempoolinfo", vec![]).await
    }

    pub async fn get_block_count(&self) -> RpcResult<u64> {
        self.call_as("getblockcount", vec![]).await
    }

    pub async fn get_block_hash(&self, height: u64) -> RpcResult<String> {
        self.call_as("getblockhash", vec![json!(height)]).await
    }

    /// `verbosity` 0 returns hex, 1 a summary with txids, 2 full transactions.
    pub async fn get_block(&self, hash: &str, verbosity: u8) -> RpcResult<Value> {
        self.call("getblock", vec![json!(hash), json!(verbosity)]).await
    }

    pub async fn get_raw_transaction(&self, txid: &str, verbose: bool) -> RpcResult<Value> {
        self.call("getrawtransaction", vec![json!(txid), json!(verbose)]).await
    }

    pub async fn validate_address(&self, address: &str) -> RpcResult<AddressValidation> {
        self.call_as("validateaddress", vec![json!(address)]).await
    }

    /// Wallet balances keyed by asset label (`bitcoin`) or asset id.
    pub async fn get_balance(&self) -> RpcResult<HashMap<String, f64>> {
        self.call_as("getbalance", vec![]).await
    }

    /// Send the policy asset; returns the txid.
    pub async fn send_to_address(&self, address: &str, amount: f64) -> RpcResult<String> {
        self.call_as("sendtoaddress", vec![json!(address), json!(amount)]).await
    }

    /// Send an issued asset using the positional Elements form of
    /// `sendtoaddress`; returns the txid.
    pub async fn send_asset_to_address(&self, address: &str, amount: f64, asset: &str) -> RpcResult<String> {
        self.call_as(
            "sendtoaddress",
            vec![
                json!(address),
                json!(amount),
                json!(""),
                json!(""),
                json!(false),
                json!(false),
                json!(6),
                json!("economical"),
                json!(false),
                json!(asset),
            ],
        )
        .await
    }

    pub async fn wallet_passphrase(&self, passphrase: &str, timeout_secs: u64) -> RpcResult<()> {
        self.call("walletpassphrase", vec![json!(passphrase), json!(timeout_secs)]).await?;
        Ok(())
    }

    pub async fn create_raw_transaction(&self, inputs: Value, outputs: Value) -> RpcResult<String> {
        self.call_as("createrawtransaction", vec![inputs, outputs]).await
    }

    pub async fn fund_raw_transaction(&self, hex: &str) -> RpcResult<FundedTransaction> {
        self.call_as("fundrawtransaction", vec![json!(hex)]).await
    }

    /// Blind with `ignoreblindfail` set and no explicit asset commitments.
    pub async fn blind_raw_transaction(&self, hex: &str) -> RpcResult<String> {
        self.call_as("blindrawtransaction", vec![json!(hex), json!(true), json!([]), json!(false)])
            .await
    }

    pub async fn sign_raw_transaction_with_wallet(&self, hex: &str) -> RpcResult<SignedTransaction> {
        self.call_as("signrawtransactionwithwallet", vec![json!(hex)]).await
    }

    /// Check a single raw transaction against mempool policy without relaying it.
    pub async fn test_mempool_accept(&self, hex: &str) -> RpcResult<Vec<MempoolAcceptResult>> {
        self.call_as("testmempoolaccept", vec![json!([hex])]).await
    }

    pub async fn send_raw_transaction(&self, hex: &str) -> RpcResult<String> {
        self.call_as("sendrawtransaction", vec![json!(hex)]).await
    }
}
