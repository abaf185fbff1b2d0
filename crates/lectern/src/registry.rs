//! Tool registry
//!
//! Populated once at startup, then frozen behind an `Arc` and shared read-only
//! by the dispatcher, the JSON-RPC layer and the manifest endpoint.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::handler::ToolHandler;
use crate::schema::{ObjectSchema, SchemaError};
use crate::types::tool::Tool;

/// A named, described, schema-checked tool.
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: ObjectSchema,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: ObjectSchema,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler: Arc::new(handler),
        }
    }

    /// Build a definition from a JSON-Schema-like declaration.
    pub fn from_declaration(
        name: impl Into<String>,
        description: impl Into<String>,
        declaration: &Value,
        handler: impl ToolHandler + 'static,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        let input_schema = ObjectSchema::from_json_schema(declaration).map_err(|source| {
            RegistryError::InvalidSchema {
                tool: name.clone(),
                source,
            }
        })?;
        Ok(Self::new(name, description, input_schema, handler))
    }

    /// The discovery entry for this tool.
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.to_tool_schema(),
        }
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("invalid input schema for tool '{tool}': {source}")]
    InvalidSchema {
        tool: String,
        #[source]
        source: SchemaError,
    },
}

#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: ToolDefinition) -> Result<(), RegistryError> {
        if self.index.contains_key(&definition.name) {
            return Err(RegistryError::DuplicateTool(definition.name));
        }
        tracing::debug!(tool = %definition.name, "registered tool");
        self.index.insert(definition.name.clone(), self.tools.len());
        self.tools.push(definition);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Discovery listing, generated from the live definitions in registration order.
    pub fn manifest(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDefinition::to_tool).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ExecutionError, ToolResult};
    use crate::schema::NormalizedArguments;
    use serde_json::json;

    async fn echo(args: NormalizedArguments) -> Result<ToolResult, ExecutionError> {
        Ok(ToolResult::structured(args.into_value()))
    }

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition::from_declaration(
            name,
            format!("{} tool", name),
            &json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" },
                    "limit": { "type": "number", "default": 5 }
                },
                "required": ["query"]
            }),
            echo,
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(definition("search")).unwrap();

        let err = registry.register(definition("search")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(ref name) if name == "search"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(definition("search")).unwrap();

        assert_eq!(registry.lookup("search").unwrap().description, "search tool");
        assert!(registry.lookup("Search").is_none());
    }

    #[test]
    fn test_manifest_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(definition(name)).unwrap();
        }

        let names: Vec<String> = registry.manifest().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_manifest_schema_matches_validation_schema() {
        let mut registry = ToolRegistry::new();
        registry.register(definition("search")).unwrap();

        for tool in registry.manifest() {
            let reparsed = ObjectSchema::from_json_schema(&tool.input_schema.to_value()).unwrap();
            assert_eq!(reparsed, registry.lookup(&tool.name).unwrap().input_schema);
        }
    }

    #[test]
    fn test_invalid_declaration_names_tool() {
        let err = ToolDefinition::from_declaration(
            "broken",
            "Broken tool",
            &json!({ "type": "object", "required": ["missing"] }),
            echo,
        )
        .unwrap_err();

        assert!(err.to_string().starts_with("invalid input schema for tool 'broken'"));
    }
}
