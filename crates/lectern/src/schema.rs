//! Declarative argument schemas
//!
//! Tool inputs are declared as JSON-Schema-like objects and parsed into an
//! [`ObjectSchema`]. The same value renders the advertised `inputSchema` and
//! validates live arguments, so discovery and validation cannot drift apart.
//!
//! Supported subset:
//! - `type`: `"string"`, `"number"`, `"integer"`, `"boolean"`, `"array"` (of
//!   strings), `"object"` (nested, same rules)
//! - `type: [T, "null"]` for fields that accept an explicit null
//! - `enum` of string literals
//! - `default`, applied only when the field is absent
//! - `description`
//!
//! Validation never stops at the first problem: every violation is collected
//! so a caller can fix all of them from one response. Undeclared keys are
//! dropped from the normalized output.

use serde::Serialize;
use serde_json::{json, Map, Number, Value};
use std::fmt;
use thiserror::Error;

use crate::types::tool::ToolSchema;

/// How a field may appear in the arguments object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be present and non-null.
    Required,
    /// May be absent; an explicit null is rejected.
    Optional,
    /// May be absent or explicitly null.
    Nullable,
}

/// The value type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    /// A string restricted to a fixed set of literals.
    Enum(Vec<String>),
    StringArray,
    Object(ObjectSchema),
}

impl FieldKind {
    fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Enum(_) => "string",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::StringArray => "array",
            FieldKind::Object(_) => "object",
        }
    }

    /// Check a non-null value, returning its normalized form.
    ///
    /// Returns `None` if any violation was recorded for this value.
    fn normalize(&self, value: &Value, path: &str, violations: &mut Vec<Violation>) -> Option<Value> {
        match (self, value) {
            (FieldKind::String, Value::String(_))
            | (FieldKind::Number, Value::Number(_))
            | (FieldKind::Boolean, Value::Bool(_)) => Some(value.clone()),
            (FieldKind::Integer, Value::Number(n)) if is_integral(n) => Some(value.clone()),
            (FieldKind::Enum(allowed), Value::String(s)) => {
                if allowed.iter().any(|a| a == s) {
                    Some(value.clone())
                } else {
                    violations.push(Violation::new(
                        path,
                        Problem::NotInEnum,
                        format!("expected one of {}, got \"{}\"", quoted_list(allowed), s),
                    ));
                    None
                }
            }
            (FieldKind::StringArray, Value::Array(items)) => {
                let before = violations.len();
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        violations.push(Violation::new(
                            format!("{}[{}]", path, i),
                            Problem::TypeMismatch,
                            format!("expected string, got {}", json_type(item)),
                        ));
                    }
                }
                (violations.len() == before).then(|| value.clone())
            }
            (FieldKind::Object(schema), Value::Object(map)) => {
                let before = violations.len();
                let normalized = schema.normalize(map, path, violations);
                (violations.len() == before).then_some(Value::Object(normalized))
            }
            _ => {
                violations.push(Violation::new(
                    path,
                    Problem::TypeMismatch,
                    format!("expected {}, got {}", self.type_name(), json_type(value)),
                ));
                None
            }
        }
    }
}

/// A single declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub presence: Presence,
    /// Substituted when the field is absent. Never applied over an explicit null.
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: FieldKind, presence: Presence) -> Self {
        Self {
            name: name.into(),
            kind,
            presence,
            default: None,
            description: None,
        }
    }

    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Required)
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Optional)
    }

    pub fn nullable(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Nullable)
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn to_json_schema(&self) -> Value {
        let mut out = match &self.kind {
            FieldKind::Object(inner) => match inner.to_json_schema() {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            _ => Map::new(),
        };

        let nullable = self.presence == Presence::Nullable;
        let type_name = self.kind.type_name();
        out.insert(
            "type".to_string(),
            if nullable {
                json!([type_name, "null"])
            } else {
                json!(type_name)
            },
        );

        match &self.kind {
            FieldKind::Enum(allowed) => {
                let mut values: Vec<Value> = allowed.iter().cloned().map(Value::String).collect();
                if nullable {
                    values.push(Value::Null);
                }
                out.insert("enum".to_string(), Value::Array(values));
            }
            FieldKind::StringArray => {
                out.insert("items".to_string(), json!({ "type": "string" }));
            }
            _ => {}
        }

        if let Some(default) = &self.default {
            out.insert("default".to_string(), default.clone());
        }
        if let Some(description) = &self.description {
            out.insert("description".to_string(), json!(description));
        }

        Value::Object(out)
    }
}

/// Schema for a JSON object: a set of named fields.
///
/// Fields are kept sorted by name, so two schemas with the same fields compare
/// equal regardless of declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    fields: Vec<FieldSpec>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any existing field of the same name.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        match self
            .fields
            .binary_search_by(|f| f.name.as_str().cmp(spec.name.as_str()))
        {
            Ok(i) => self.fields[i] = spec,
            Err(i) => self.fields.insert(i, spec),
        }
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate raw arguments, producing their normalized form or every violation found.
    pub fn validate(&self, raw: &Value) -> Result<NormalizedArguments, ValidationFailure> {
        let mut violations = Vec::new();

        let normalized = match raw {
            Value::Object(map) => self.normalize(map, "", &mut violations),
            other => {
                violations.push(Violation::new(
                    "",
                    Problem::NotAnObject,
                    format!("arguments must be an object, got {}", json_type(other)),
                ));
                Map::new()
            }
        };

        if violations.is_empty() {
            Ok(NormalizedArguments(normalized))
        } else {
            Err(ValidationFailure { violations })
        }
    }

    fn normalize(
        &self,
        map: &Map<String, Value>,
        prefix: &str,
        violations: &mut Vec<Violation>,
    ) -> Map<String, Value> {
        let mut out = Map::new();

        for field in &self.fields {
            let path = join_path(prefix, &field.name);
            match (map.get(&field.name), field.presence) {
                (None, Presence::Required) => {
                    violations.push(Violation::new(path, Problem::Missing, "required field is missing"));
                }
                (None, _) => {
                    if let Some(default) = &field.default {
                        out.insert(field.name.clone(), default.clone());
                    }
                }
                (Some(Value::Null), Presence::Nullable) => {
                    out.insert(field.name.clone(), Value::Null);
                }
                (Some(Value::Null), _) => {
                    violations.push(Violation::new(
                        path,
                        Problem::NullNotAllowed,
                        format!("expected {}, got null", field.kind.type_name()),
                    ));
                }
                (Some(value), _) => {
                    if let Some(normalized) = field.kind.normalize(value, &path, violations) {
                        out.insert(field.name.clone(), normalized);
                    }
                }
            }
        }

        out
    }

    /// Render as a JSON Schema object (`type`, `properties`, `required`).
    pub fn to_json_schema(&self) -> Value {
        self.to_tool_schema().to_value()
    }

    pub fn to_tool_schema(&self) -> ToolSchema {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            properties.insert(field.name.clone(), field.to_json_schema());
            if field.presence == Presence::Required {
                required.push(field.name.clone());
            }
        }

        ToolSchema::new(properties, required)
    }

    /// Parse a JSON-Schema-like declaration.
    pub fn from_json_schema(value: &Value) -> Result<Self, SchemaError> {
        let path = "$";
        let obj = value.as_object().ok_or_else(|| SchemaError::NotAnObject {
            path: path.to_string(),
        })?;

        match obj.get("type") {
            Some(Value::String(t)) if t == "object" => {}
            other => {
                return Err(SchemaError::UnsupportedType {
                    path: path.to_string(),
                    found: describe(other),
                })
            }
        }

        Self::parse_properties(obj, path)
    }

    fn parse_properties(obj: &Map<String, Value>, path: &str) -> Result<Self, SchemaError> {
        let required: Vec<&str> = match obj.get("required") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str().ok_or_else(|| SchemaError::InvalidRequired {
                        path: path.to_string(),
                    })
                })
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(SchemaError::InvalidRequired {
                    path: path.to_string(),
                })
            }
        };

        let empty = Map::new();
        let properties = match obj.get("properties") {
            None => &empty,
            Some(Value::Object(props)) => props,
            Some(_) => {
                return Err(SchemaError::NotAnObject {
                    path: format!("{}.properties", path),
                })
            }
        };

        if let Some(missing) = required.iter().find(|name| !properties.contains_key(**name)) {
            return Err(SchemaError::UnknownRequired {
                path: path.to_string(),
                field: missing.to_string(),
            });
        }

        let mut schema = ObjectSchema::new();
        for (name, raw) in properties {
            let field_path = format!("{}.{}", path, name);
            let is_required = required.contains(&name.as_str());
            schema = schema.field(parse_field(name, raw, is_required, &field_path)?);
        }

        Ok(schema)
    }
}

fn parse_field(name: &str, raw: &Value, required: bool, path: &str) -> Result<FieldSpec, SchemaError> {
    let obj = raw.as_object().ok_or_else(|| SchemaError::NotAnObject {
        path: path.to_string(),
    })?;

    let (type_name, nullable) = parse_type(obj.get("type"), path)?;

    let kind = match type_name.as_str() {
        "string" => match obj.get("enum") {
            None => FieldKind::String,
            Some(Value::Array(values)) => {
                let mut allowed = Vec::new();
                for v in values {
                    match v {
                        Value::String(s) => allowed.push(s.clone()),
                        Value::Null if nullable => {}
                        _ => return Err(SchemaError::InvalidEnum { path: path.to_string() }),
                    }
                }
                if allowed.is_empty() {
                    return Err(SchemaError::InvalidEnum { path: path.to_string() });
                }
                FieldKind::Enum(allowed)
            }
            Some(_) => return Err(SchemaError::InvalidEnum { path: path.to_string() }),
        },
        "number" => FieldKind::Number,
        "integer" => FieldKind::Integer,
        "boolean" => FieldKind::Boolean,
        "array" => match obj.get("items").and_then(|items| items.get("type")) {
            Some(Value::String(t)) if t == "string" => FieldKind::StringArray,
            _ => return Err(SchemaError::UnsupportedItems { path: path.to_string() }),
        },
        "object" => FieldKind::Object(ObjectSchema::parse_properties(obj, path)?),
        other => {
            return Err(SchemaError::UnsupportedType {
                path: path.to_string(),
                found: format!("\"{}\"", other),
            })
        }
    };

    let presence = match (required, nullable) {
        (true, true) => return Err(SchemaError::RequiredNullable { path: path.to_string() }),
        (true, false) => Presence::Required,
        (false, true) => Presence::Nullable,
        (false, false) => Presence::Optional,
    };

    let mut spec = FieldSpec::new(name, kind, presence);

    if let Some(description) = obj.get("description").and_then(|d| d.as_str()) {
        spec = spec.with_description(description);
    }

    if let Some(default) = obj.get("default") {
        if presence == Presence::Required {
            return Err(SchemaError::DefaultOnRequired { path: path.to_string() });
        }
        check_default(&spec, default, path)?;
        spec = spec.with_default(default.clone());
    }

    Ok(spec)
}

fn check_default(spec: &FieldSpec, default: &Value, path: &str) -> Result<(), SchemaError> {
    if default.is_null() {
        return if spec.presence == Presence::Nullable {
            Ok(())
        } else {
            Err(SchemaError::InvalidDefault {
                path: path.to_string(),
                reason: "null default on a non-nullable field".to_string(),
            })
        };
    }

    let mut violations = Vec::new();
    spec.kind.normalize(default, path, &mut violations);
    match violations.into_iter().next() {
        None => Ok(()),
        Some(v) => Err(SchemaError::InvalidDefault {
            path: path.to_string(),
            reason: v.message,
        }),
    }
}

/// Returns (type name, nullable).
fn parse_type(value: Option<&Value>, path: &str) -> Result<(String, bool), SchemaError> {
    match value {
        Some(Value::String(t)) => Ok((t.clone(), false)),
        Some(Value::Array(types)) => {
            let names: Vec<&str> = types.iter().filter_map(|t| t.as_str()).collect();
            let nullable = names.contains(&"null");
            let concrete: Vec<&str> = names.into_iter().filter(|t| *t != "null").collect();
            match concrete.as_slice() {
                [single] if types.len() == concrete.len() + usize::from(nullable) => {
                    Ok((single.to_string(), nullable))
                }
                _ => Err(SchemaError::UnsupportedType {
                    path: path.to_string(),
                    found: describe(value),
                }),
            }
        }
        other => Err(SchemaError::UnsupportedType {
            path: path.to_string(),
            found: describe(other),
        }),
    }
}

/// Errors in a schema declaration. These surface at startup, never per request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("{path}: schema must be a JSON object")]
    NotAnObject { path: String },

    #[error("{path}: unsupported type {found}")]
    UnsupportedType { path: String, found: String },

    #[error("{path}: enum must be a non-empty array of strings")]
    InvalidEnum { path: String },

    #[error("{path}: only arrays of strings are supported")]
    UnsupportedItems { path: String },

    #[error("{path}: required must be an array of property names")]
    InvalidRequired { path: String },

    #[error("{path}: required field \"{field}\" is not declared in properties")]
    UnknownRequired { path: String, field: String },

    #[error("{path}: a required field cannot also be nullable")]
    RequiredNullable { path: String },

    #[error("{path}: a required field cannot declare a default")]
    DefaultOnRequired { path: String },

    #[error("{path}: default does not match the declared type: {reason}")]
    InvalidDefault { path: String, reason: String },
}

/// Arguments that passed validation, with defaults applied and undeclared keys dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedArguments(Map<String, Value>);

impl NormalizedArguments {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(|v| v.as_f64())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// What went wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    Missing,
    NullNotAllowed,
    TypeMismatch,
    NotInEnum,
    NotAnObject,
}

/// One offending field. `field` is a dotted path; empty for the arguments root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub problem: Problem,
    pub message: String,
}

impl Violation {
    fn new(field: impl Into<String>, problem: Problem, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Every violation found while validating one arguments object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub violations: Vec<Violation>,
}

impl ValidationFailure {
    /// Paths of all offending fields.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.field.as_str())
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.fields().any(|f| f == field)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid arguments: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "(missing)".to_string(),
        Some(v) => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome_schema() -> ObjectSchema {
        ObjectSchema::from_json_schema(&json!({
            "type": "object",
            "properties": {
                "content_id": { "type": "string" },
                "outcome": { "type": "string", "enum": ["success", "fail"] },
                "score": { "type": ["number", "null"] },
                "notes": { "type": ["string", "null"] },
                "tags": { "type": "array", "items": { "type": "string" } },
                "limit": { "type": ["number", "null"], "default": 5 },
                "context": {
                    "type": "object",
                    "properties": {
                        "session_id": { "type": "string" },
                        "attempt": { "type": "integer" }
                    },
                    "required": ["session_id"]
                }
            },
            "required": ["content_id", "outcome"]
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_required_field_is_reported() {
        let failure = outcome_schema()
            .validate(&json!({ "outcome": "success" }))
            .unwrap_err();

        assert!(failure.mentions("content_id"));
        assert_eq!(failure.violations[0].problem, Problem::Missing);
    }

    #[test]
    fn test_all_violations_reported_in_one_pass() {
        let failure = outcome_schema()
            .validate(&json!({
                "outcome": "maybe",
                "score": "high",
                "tags": ["ok", 3],
                "context": { "attempt": 1.5 }
            }))
            .unwrap_err();

        let fields: Vec<&str> = failure.fields().collect();
        assert_eq!(
            fields,
            vec!["content_id", "context.attempt", "context.session_id", "outcome", "score", "tags[1]"]
        );
    }

    #[test]
    fn test_enum_rejects_value_outside_set() {
        let failure = outcome_schema()
            .validate(&json!({ "content_id": "c1", "outcome": "maybe" }))
            .unwrap_err();

        assert_eq!(failure.violations.len(), 1);
        let violation = &failure.violations[0];
        assert_eq!(violation.field, "outcome");
        assert_eq!(violation.problem, Problem::NotInEnum);
        assert_eq!(violation.message, "expected one of \"success\", \"fail\", got \"maybe\"");
    }

    #[test]
    fn test_default_applied_only_when_absent() {
        let schema = outcome_schema();

        let absent = schema
            .validate(&json!({ "content_id": "c1", "outcome": "fail" }))
            .unwrap();
        assert_eq!(absent.get("limit"), Some(&json!(5)));

        let explicit_null = schema
            .validate(&json!({ "content_id": "c1", "outcome": "fail", "limit": null }))
            .unwrap();
        assert_eq!(explicit_null.get("limit"), Some(&Value::Null));

        let given = schema
            .validate(&json!({ "content_id": "c1", "outcome": "fail", "limit": 20 }))
            .unwrap();
        assert_eq!(given.get("limit"), Some(&json!(20)));
    }

    #[test]
    fn test_optional_fields_stay_absent() {
        let normalized = outcome_schema()
            .validate(&json!({ "content_id": "c1", "outcome": "success" }))
            .unwrap();

        assert!(!normalized.contains("notes"));
        assert!(!normalized.contains("score"));
        assert!(!normalized.contains("context"));
    }

    #[test]
    fn test_null_rejected_for_non_nullable_optional() {
        let failure = outcome_schema()
            .validate(&json!({ "content_id": "c1", "outcome": "success", "tags": null }))
            .unwrap_err();

        assert_eq!(failure.violations[0].field, "tags");
        assert_eq!(failure.violations[0].problem, Problem::NullNotAllowed);
    }

    #[test]
    fn test_nullable_rejects_type_mismatch() {
        let failure = outcome_schema()
            .validate(&json!({ "content_id": "c1", "outcome": "success", "notes": 12 }))
            .unwrap_err();

        assert_eq!(failure.violations[0].field, "notes");
        assert_eq!(failure.violations[0].message, "expected string, got number");
    }

    #[test]
    fn test_undeclared_keys_dropped() {
        let normalized = outcome_schema()
            .validate(&json!({ "content_id": "c1", "outcome": "success", "extra": true }))
            .unwrap();

        assert!(!normalized.contains("extra"));
    }

    #[test]
    fn test_non_object_arguments() {
        let failure = outcome_schema().validate(&json!(["content_id"])).unwrap_err();

        assert_eq!(failure.violations.len(), 1);
        assert_eq!(failure.violations[0].field, "");
        assert_eq!(failure.violations[0].problem, Problem::NotAnObject);
    }

    #[test]
    fn test_integer_accepts_whole_numbers() {
        let schema = outcome_schema();
        let ok = schema.validate(&json!({
            "content_id": "c1",
            "outcome": "success",
            "context": { "session_id": "s", "attempt": 2.0 }
        }));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let schema = outcome_schema();
        let first = schema
            .validate(&json!({
                "content_id": "c1",
                "outcome": "success",
                "notes": null,
                "tags": ["physics"],
                "context": { "session_id": "s1", "ignored": 1 }
            }))
            .unwrap();

        let second = schema.validate(&first.clone().into_value()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rendered_schema_parses_back_identically() {
        let schema = outcome_schema();
        let reparsed = ObjectSchema::from_json_schema(&schema.to_json_schema()).unwrap();
        assert_eq!(reparsed, schema);
    }

    #[test]
    fn test_builder_matches_parsed_declaration() {
        let built = ObjectSchema::new()
            .field(FieldSpec::optional("limit", FieldKind::Number).with_default(json!(5)))
            .field(FieldSpec::required("query", FieldKind::String).with_description("Search text"));

        let parsed = ObjectSchema::from_json_schema(&json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search text" },
                "limit": { "type": "number", "default": 5 }
            },
            "required": ["query"]
        }))
        .unwrap();

        assert_eq!(built, parsed);
    }

    #[test]
    fn test_rendered_schema_shape() {
        let rendered = outcome_schema().to_json_schema();

        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["content_id", "outcome"]));
        assert_eq!(rendered["properties"]["notes"]["type"], json!(["string", "null"]));
        assert_eq!(rendered["properties"]["outcome"]["enum"], json!(["success", "fail"]));
        assert_eq!(rendered["properties"]["context"]["required"], json!(["session_id"]));
    }

    #[test]
    fn test_schema_declaration_errors() {
        let unknown_required = ObjectSchema::from_json_schema(&json!({
            "type": "object",
            "properties": {},
            "required": ["query"]
        }));
        assert!(matches!(unknown_required, Err(SchemaError::UnknownRequired { .. })));

        let default_on_required = ObjectSchema::from_json_schema(&json!({
            "type": "object",
            "properties": { "limit": { "type": "number", "default": 5 } },
            "required": ["limit"]
        }));
        assert!(matches!(default_on_required, Err(SchemaError::DefaultOnRequired { .. })));

        let bad_default = ObjectSchema::from_json_schema(&json!({
            "type": "object",
            "properties": { "limit": { "type": "number", "default": "five" } }
        }));
        assert!(matches!(bad_default, Err(SchemaError::InvalidDefault { .. })));

        let unsupported = ObjectSchema::from_json_schema(&json!({
            "type": "object",
            "properties": { "blob": { "type": "array", "items": { "type": "integer" } } }
        }));
        assert_eq!(
            unsupported.unwrap_err().to_string(),
            "$.blob: only arrays of strings are supported"
        );

        let not_object = ObjectSchema::from_json_schema(&json!({ "type": "string" }));
        assert!(matches!(not_object, Err(SchemaError::UnsupportedType { .. })));
    }

    #[test]
    fn test_failure_display_lists_every_field() {
        let failure = outcome_schema().validate(&json!({})).unwrap_err();
        assert_eq!(
            failure.to_string(),
            "invalid arguments: content_id: required field is missing; outcome: required field is missing"
        );
    }
}
