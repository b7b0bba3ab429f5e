//! Request and response envelopes exchanged with the node

use crate::error::{RpcError, RpcResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Outgoing call. No `id` is sent; each call carries exactly one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub params: Vec<Value>,
    pub jsonrpc: String,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
            jsonrpc: JSONRPC_VERSION.to_string(),
        }
    }
}

/// Node reply. A non-null `error` wins over whatever `result` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<Value>,
}

impl Response {
    pub fn into_result(self) -> RpcResult<Value> {
        match self.error {
            Some(error) if !error.is_null() => Err(RpcError::Node(error)),
            _ => Ok(self.result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = Request::new("getblock", vec![json!("00ab"), json!(2)]);
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(
            wire,
            json!({"method": "getblock", "params": ["00ab", 2], "jsonrpc": "2.0"})
        );
        assert!(wire.get("id").is_none());
    }

    #[test]
    fn test_request_preserves_param_order() {
        let params = vec![json!(null), json!([]), json!("x"), json!(1.5), json!({"data": "00"}), json!(false)];
        let request = Request::new("createrawtransaction", params.clone());
        let text = serde_json::to_string(&request).unwrap();
        let back: Request = serde_json::from_str(&text).unwrap();
        assert_eq!(back.params, params);
    }

    #[test]
    fn test_response_with_result() {
        let response: Response = serde_json::from_value(json!({"result": 42, "error": null})).unwrap();
        assert_eq!(response.into_result().unwrap(), json!(42));
    }

    #[test]
    fn test_response_error_is_authoritative() {
        let response: Response =
            serde_json::from_value(json!({"result": "ignored", "error": "bad params"})).unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.node_error(), Some(&json!("bad params")));
    }

    #[test]
    fn test_response_missing_fields() {
        let response: Response = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.into_result().unwrap(), Value::Null);

        let response: Response = serde_json::from_value(json!({"result": [1, 2]})).unwrap();
        assert_eq!(response.into_result().unwrap(), json!([1, 2]));
    }
}
