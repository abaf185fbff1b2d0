//! `tools/list` and `tools/call` payloads.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::content::Content;

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: ToolSchema,
}

/// Tool input schemas are always objects, so `type` is fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    #[default]
    Object,
}

/// Advertised input schema, as rendered from an `ObjectSchema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Sorted the same way as `properties`.
    #[serde(default)]
    pub required: Vec<String>,
}

impl ToolSchema {
    pub fn new(properties: Map<String, Value>, required: Vec<String>) -> Self {
        Self {
            schema_type: SchemaType::Object,
            properties,
            required,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        })
    }
}

/// `tools/call` params. Absent `arguments` is treated as `{}` upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

/// The whole manifest. Never paginated; `nextCursor` is always omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl ListToolsResult {
    pub fn all(tools: Vec<Tool>) -> Self {
        Self {
            tools,
            next_cursor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_entry_is_camel_case() {
        let mut properties = Map::new();
        properties.insert("query".into(), json!({ "type": "string" }));
        let tool = Tool {
            name: "search_content".into(),
            description: "Search stored content".into(),
            input_schema: ToolSchema::new(properties, vec!["query".into()]),
        };

        let listing = serde_json::to_value(ListToolsResult::all(vec![tool.clone()])).unwrap();
        assert_eq!(listing["tools"][0]["inputSchema"], tool.input_schema.to_value());
        assert_eq!(listing["tools"][0]["inputSchema"]["type"], "object");
        assert!(listing.get("nextCursor").is_none());

        let parsed: ListToolsResult = serde_json::from_value(listing).unwrap();
        assert_eq!(parsed.tools, vec![tool]);
    }

    #[test]
    fn test_non_object_schema_type_rejected() {
        let result = serde_json::from_value::<ToolSchema>(json!({ "type": "array" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_call_params_arguments_optional() {
        let params: CallToolParams = serde_json::from_value(json!({ "name": "service_info" })).unwrap();
        assert_eq!(params.name, "service_info");
        assert!(params.arguments.is_none());
    }

    #[test]
    fn test_call_result_wire_names() {
        let result = CallToolResult {
            content: vec![Content::text("Found 2 results")],
            structured_content: Some(json!({ "results": [1, 2] })),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["structuredContent"]["results"][1], 2);
    }
}
