//! In-process node stub for RPC client tests.
//!
//! Serves every path on `127.0.0.1`, records each request and answers
//! through a caller-supplied closure. A request whose method is `hang`
//! never gets an answer within any test's lifetime.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::Router;
use liquid_rpc::RpcConfig;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub type Reply = Arc<dyn Fn(&Value) -> (StatusCode, String) + Send + Sync>;

/// One request as the node saw it
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub body: Value,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct StubState {
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    reply: Reply,
}

pub struct NodeStub {
    pub addr: SocketAddr,
    state: StubState,
    handle: JoinHandle<()>,
}

impl NodeStub {
    pub async fn start<F>(reply: F) -> Self
    where
        F: Fn(&Value) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self::serve(listener, reply)
    }

    pub fn serve<F>(listener: TcpListener, reply: F) -> Self
    where
        F: Fn(&Value) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let addr = listener.local_addr().unwrap();
        let state = StubState {
            hits: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(reply),
        };

        let app = Router::new().fallback(handle).with_state(state.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, handle }
    }

    /// Endpoint URL with `user:pass` credentials
    pub fn url(&self) -> String {
        format!("http://user:pass@{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

impl Drop for NodeStub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(State(state): State<StubState>, uri: Uri, headers: HeaderMap, body: Bytes) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let header_str = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

    state.seen.lock().unwrap().push(SeenRequest {
        path: uri.path().to_string(),
        body: body.clone(),
        content_type: header_str(header::CONTENT_TYPE),
        authorization: header_str(header::AUTHORIZATION),
    });

    if body["method"] == "hang" {
        tokio::time::sleep(Duration::from_secs(600)).await;
    }

    (state.reply)(&body)
}

/// `200 {"result": result, "error": null}`
pub fn ok(result: Value) -> (StatusCode, String) {
    (StatusCode::OK, json!({"result": result, "error": null}).to_string())
}

/// Node-reported error envelope with the given status
pub fn node_error(status: StatusCode, error: Value) -> (StatusCode, String) {
    (status, json!({"result": null, "error": error}).to_string())
}

/// Echo the request params back as the result
pub fn echo_params(request: &Value) -> (StatusCode, String) {
    ok(request["params"].clone())
}

/// Client settings with a short retry interval
pub fn fast_config(interval_ms: u64) -> RpcConfig {
    RpcConfig {
        retry_interval_ms: interval_ms,
        ..Default::default()
    }
}

/// A loopback address nothing is listening on
pub fn refused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
