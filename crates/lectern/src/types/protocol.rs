//! `initialize` handshake payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol revision reported in every `initialize` reply.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// `serverInfo` / `clientInfo`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

impl Implementation {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    /// Not negotiated; accepted and ignored.
    #[serde(default)]
    pub capabilities: Value,
    pub client_info: Implementation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl InitializeResult {
    pub fn new(server_info: Implementation, capabilities: ServerCapabilities) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_owned(),
            capabilities,
            server_info,
            instructions: None,
        }
    }

    pub fn with_instructions(self, instructions: impl Into<String>) -> Self {
        Self {
            instructions: Some(instructions.into()),
            ..self
        }
    }
}

/// Only the tools capability is ever offered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

impl ServerCapabilities {
    pub fn with_tools() -> Self {
        Self {
            tools: Some(ToolsCapability { list_changed: false }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// The registry is frozen at startup, so this stays false.
    pub list_changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_handshake_reply_advertises_static_tools() {
        let reply = InitializeResult::new(
            Implementation::new("almanac", "0.1.0"),
            ServerCapabilities::with_tools(),
        );

        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            value,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": { "name": "almanac", "version": "0.1.0" }
            })
        );
    }

    #[test]
    fn test_client_capabilities_optional() {
        let params: InitializeParams = serde_json::from_value(json!({
            "protocolVersion": "2025-06-18",
            "clientInfo": { "name": "client", "version": "1.0" }
        }))
        .unwrap();
        assert_eq!(params.client_info, Implementation::new("client", "1.0"));
        assert!(params.capabilities.is_null());
    }
}
