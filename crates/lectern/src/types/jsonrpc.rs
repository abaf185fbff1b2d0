//! JSON-RPC 2.0 envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::error::ErrorData;

/// The `jsonrpc` member. Anything other than `"2.0"` fails to deserialize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsonRpcVersion {
    #[default]
    #[serde(rename = "2.0")]
    V2,
}

/// Opaque correlation token chosen by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => n.fmt(f),
            RequestId::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_owned())
    }
}

/// An inbound call. Without an `id` it is a notification and gets no reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcMessage {
    pub jsonrpc: JsonRpcVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcMessage {
    pub fn request(id: impl Into<RequestId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion::V2,
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion::V2,
            id: None,
            method: method.into(),
            params: None,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Either the `result` or the `error` member of a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonRpcOutcome {
    Result(Value),
    Error(ErrorData),
}

/// A reply envelope. `id` is `null` only when the request was too broken to
/// read one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: JsonRpcVersion,
    pub id: Option<RequestId>,
    #[serde(flatten)]
    pub outcome: JsonRpcOutcome,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JsonRpcVersion::V2,
            id: Some(id),
            outcome: JsonRpcOutcome::Result(result),
        }
    }

    pub fn failure(id: Option<RequestId>, error: ErrorData) -> Self {
        Self {
            jsonrpc: JsonRpcVersion::V2,
            id,
            outcome: JsonRpcOutcome::Error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_keep_their_json_type() {
        let numeric: RequestId = serde_json::from_value(json!(7)).unwrap();
        let textual: RequestId = serde_json::from_value(json!("7")).unwrap();

        assert_eq!(numeric, RequestId::Number(7));
        assert_eq!(textual, RequestId::from("7"));
        assert_ne!(numeric, textual);
        assert_eq!(serde_json::to_value(&textual).unwrap(), json!("7"));
    }

    #[test]
    fn test_version_must_be_2_0() {
        let old = serde_json::from_value::<JsonRpcMessage>(json!({ "jsonrpc": "1.0", "id": 1, "method": "ping" }));
        assert!(old.is_err());

        let missing = serde_json::from_value::<JsonRpcMessage>(json!({ "id": 1, "method": "ping" }));
        assert!(missing.is_err());
    }

    #[test]
    fn test_notification_has_no_id_on_the_wire() {
        let parsed: JsonRpcMessage =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })).unwrap();
        assert!(parsed.is_notification());

        let encoded = serde_json::to_value(JsonRpcMessage::notification("notifications/initialized")).unwrap();
        assert!(encoded.get("id").is_none());
    }

    #[test]
    fn test_reply_carries_exactly_one_outcome() {
        let ok = serde_json::to_value(JsonRpcResponse::success(RequestId::from("a"), json!({ "n": 1 }))).unwrap();
        assert_eq!(ok, json!({ "jsonrpc": "2.0", "id": "a", "result": { "n": 1 } }));

        let failed = serde_json::to_value(JsonRpcResponse::failure(None, ErrorData::parse_error("bad"))).unwrap();
        assert!(failed["id"].is_null());
        assert_eq!(failed["error"]["code"], -32700);
        assert!(failed.get("result").is_none());
    }
}
