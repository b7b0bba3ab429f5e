//! Retrying JSON-RPC client

use crate::endpoint::{Endpoint, RoutingPolicy, DEFAULT_SOCKS5_PROXY};
use crate::envelope::{Request, Response};
use crate::error::{RpcError, RpcResult};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Client tuning. Defaults match the node-facing behaviour the faucet has
/// always had: five connection attempts, ten seconds apart, no per-attempt
/// timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Connection attempts per call before giving up
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed wait between connection attempts (milliseconds)
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// SOCKS5 proxy used for onion endpoints
    #[serde(default = "default_proxy_addr")]
    pub proxy_addr: String,

    /// Per-attempt request timeout (milliseconds). `None` waits as long as
    /// the transport does, so a connected but silent node blocks the call.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

fn default_retry_attempts() -> u32 { 5 }
fn default_retry_interval_ms() -> u64 { 10_000 }
fn default_proxy_addr() -> String { DEFAULT_SOCKS5_PROXY.to_string() }

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_interval_ms: default_retry_interval_ms(),
            proxy_addr: default_proxy_addr(),
            request_timeout_ms: None,
        }
    }
}

impl RpcConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// JSON-RPC client bound to one node endpoint.
///
/// Cloning is cheap and clones share the same connection pool, so one
/// client can serve every request handler of the surrounding service.
/// Routing (direct or SOCKS5) is fixed when the client is built.
#[derive(Debug, Clone)]
pub struct RpcClient {
    endpoint: Endpoint,
    routing: RoutingPolicy,
    config: RpcConfig,
    http: reqwest::Client,
}

impl RpcClient {
    /// Build a client. Performs no network I/O.
    pub fn new(endpoint: Endpoint, config: RpcConfig) -> RpcResult<Self> {
        if config.retry_attempts == 0 {
            return Err(RpcError::Endpoint("retry_attempts must be at least 1".to_string()));
        }

        let routing = endpoint.routing(&config.proxy_addr);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);

        builder = match &routing {
            RoutingPolicy::Direct => builder.no_proxy(),
            RoutingPolicy::Socks5 { proxy } => {
                let proxy = reqwest::Proxy::all(proxy.as_str())
                    .map_err(|e| RpcError::Endpoint(format!("Invalid SOCKS5 proxy {}: {}", proxy, e)))?;
                builder.proxy(proxy)
            }
        };

        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| RpcError::Endpoint(format!("Failed to build HTTP client: {}", e)))?;

        if let RoutingPolicy::Socks5 { proxy } = &routing {
            info!("Routing RPC traffic for {} through {}", endpoint, proxy);
        }

        Ok(Self {
            endpoint,
            routing,
            config,
            http,
        })
    }

    /// Parse `url` and build a client with default settings.
    pub fn from_url(url: &str) -> RpcResult<Self> {
        Self::new(Endpoint::parse(url)?, RpcConfig::default())
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn routing(&self) -> &RoutingPolicy {
        &self.routing
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Call `method` with positional `params` and return the node's `result`.
    ///
    /// Connection failures are retried after a fixed wait until the attempt
    /// budget is spent. Any delivered response is final: a status other than
    /// 200 or 500 is a transport error, a non-null `error` member is a
    /// semantic error, and everything else yields `result` untouched.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> RpcResult<Value> {
        let request = Request::new(method, params);
        debug!(method, "RPC call");

        let response = self.send_with_retry(&request).await?;
        Self::interpret(response).await
    }

    /// [`call`](Self::call) and decode the result into `T`.
    pub async fn call_as<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> RpcResult<T> {
        let value = self.call(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| RpcError::InvalidResponse(format!("Unexpected result for {}: {}", method, e)))
    }

    async fn send_with_retry(&self, request: &Request) -> RpcResult<reqwest::Response> {
        let attempts = self.config.retry_attempts;
        let mut tries_left = attempts;
        let mut had_connection_failures = false;

        loop {
            match self.post(request).send().await {
                Ok(response) => {
                    if had_connection_failures {
                        info!(method = %request.method, "Connected for remote procedure call after retry");
                    }
                    return Ok(response);
                }
                Err(e) if is_connection_failure(&e) => {
                    tries_left -= 1;
                    if tries_left == 0 {
                        error!(method = %request.method, attempts, "Failed to connect for remote procedure call: {}", e);
                        return Err(RpcError::RetriesExhausted { attempts, source: e });
                    }
                    had_connection_failures = true;
                    warn!(
                        method = %request.method,
                        tries_left,
                        "Couldn't connect for remote procedure call, retrying in {}ms: {}",
                        self.config.retry_interval_ms,
                        e
                    );
                    tokio::time::sleep(self.config.retry_interval()).await;
                }
                Err(e) => {
                    warn!(method = %request.method, "RPC request failed: {}", e);
                    return Err(RpcError::Request(e));
                }
            }
        }
    }

    fn post(&self, request: &Request) -> reqwest::RequestBuilder {
        let builder = self.http.post(self.endpoint.url().clone()).json(request);
        match self.endpoint.username() {
            Some(user) => builder.basic_auth(user, self.endpoint.password()),
            None => builder,
        }
    }

    async fn interpret(response: reqwest::Response) -> RpcResult<Value> {
        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::INTERNAL_SERVER_ERROR {
            return Err(RpcError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await.map_err(RpcError::Request)?;
        let envelope: Response = serde_json::from_slice(&body)
            .map_err(|e| RpcError::InvalidResponse(format!("HTTP {}: {}", status.as_u16(), e)))?;

        envelope.into_result()
    }
}

/// Whether `err` means the node could not be reached: the connection (or
/// the SOCKS5 proxy) refused us, or the node dropped the connection before
/// answering. Timeouts are not connection failures.
fn is_connection_failure(err: &reqwest::Error) -> bool {
    if err.is_timeout() {
        return false;
    }
    if err.is_connect() {
        return true;
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() {
                return true;
            }
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted | io::ErrorKind::BrokenPipe
            ) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}
