//! Fake Liquid node for faucet tests.
//!
//! Answers the subset of wallet and chain methods the faucet uses over a
//! synthetic chain whose tip is `tip`. Every request is recorded.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router};
use liquid_faucet::{FaucetConfig, FaucetService, NodeConfig};
use liquid_rpc::{RpcClient, RpcConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TEST_ASSET: &str = "38fca2d939696061a8f76d4e6b5eecd54e3b4221c846f24a6b279e79952850a5";
pub const KNOWN_TXID: &str = "aa00000000000000000000000000000000000000000000000000000000000000";
pub const VALID_ADDRESS: &str = "tlq1qqvalidaddress";

#[derive(Clone)]
struct NodeState {
    tip: u64,
    calls: Arc<Mutex<Vec<Value>>>,
}

pub struct FakeNode {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<Value>>>,
    handle: JoinHandle<()>,
}

impl FakeNode {
    pub async fn start(tip: u64) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = NodeState {
            tip,
            calls: Arc::new(Mutex::new(Vec::new())),
        };
        let calls = state.calls.clone();

        let app = Router::new().fallback(handle).with_state(state);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, calls, handle }
    }

    /// Methods called so far, in order
    pub fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Params of the first call to `method`
    pub fn params_of(&self, method: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c["method"] == method)
            .map(|c| c["params"].clone())
    }

    pub fn service(&self) -> FaucetService {
        let config = FaucetConfig {
            node: NodeConfig {
                host: "127.0.0.1".to_string(),
                port: self.addr.port(),
                wallet: "faucet".to_string(),
                passphrase: "hunter2".to_string(),
                ..Default::default()
            },
            rpc: RpcConfig {
                retry_interval_ms: 10,
                ..Default::default()
            },
            ..Default::default()
        };
        let rpc = RpcClient::new(config.node.endpoint().unwrap(), config.rpc.clone()).unwrap();
        FaucetService::new(config, Arc::new(rpc))
    }
}

impl Drop for FakeNode {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn ok(result: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({"result": result, "error": null})))
}

fn fail(code: i64, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"result": null, "error": {"code": code, "message": message}})),
    )
}

async fn handle(State(state): State<NodeState>, Json(request): Json<Value>) -> (StatusCode, Json<Value>) {
    state.calls.lock().unwrap().push(request.clone());
    let params = &request["params"];

    match request["method"].as_str().unwrap_or_default() {
        "getblockchaininfo" => ok(json!({
            "chain": "liquidtestnet",
            "blocks": state.tip,
            "headers": state.tip,
            "size_on_disk": 3 * 1024 * 1024
        })),
        "getmempoolinfo" => ok(json!({"size": 2, "bytes": 512 * 1024})),
        "getblockcount" => ok(json!(state.tip)),
        "getblockhash" => match params[0].as_u64() {
            Some(height) if height <= state.tip => ok(json!(format!("hash{}", height))),
            _ => fail(-8, "Block height out of range"),
        },
        "getblock" => {
            let hash = params[0].as_str().unwrap_or_default();
            let height: u64 = hash.trim_start_matches("hash").parse().unwrap_or(0);
            ok(json!({
                "hash": hash,
                "height": height,
                "size": 1000 + height,
                "time": 1_600_000_000 + height,
                "nTx": 1,
                "tx": [format!("coinbase{}", height)]
            }))
        }
        "getrawtransaction" => {
            if params[0] == KNOWN_TXID {
                ok(json!({"txid": KNOWN_TXID, "vin": [], "vout": []}))
            } else {
                fail(-5, "No such mempool or blockchain transaction")
            }
        }
        "validateaddress" => ok(json!({"isvalid": params[0] == VALID_ADDRESS})),
        "getbalance" => ok(json!({"bitcoin": 2.5, TEST_ASSET: 0.0004})),
        "sendtoaddress" => ok(json!("sendtxid")),
        "walletpassphrase" => ok(Value::Null),
        "createrawtransaction" => ok(json!("rawtx")),
        "fundrawtransaction" => ok(json!({"hex": "fundedtx", "fee": 0.00003, "changepos": 0})),
        "blindrawtransaction" => ok(json!("blindedtx")),
        "signrawtransactionwithwallet" => ok(json!({"hex": "signedtx", "complete": true})),
        "testmempoolaccept" => {
            let hex = params[0][0].as_str().unwrap_or_default();
            if hex == "badtx" {
                ok(json!([{"txid": "bb", "allowed": false, "reject-reason": "bad-txns-inputs-missingorspent"}]))
            } else {
                ok(json!([{"txid": "cc", "allowed": true}]))
            }
        }
        "sendrawtransaction" => ok(json!("relayedtxid")),
        _ => fail(-32601, "Method not found"),
    }
}
