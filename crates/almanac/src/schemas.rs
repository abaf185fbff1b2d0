//! Input schema declarations for the almanac tools.
//!
//! Written as JSON literals so they read the way clients see them in
//! `tools/list`. Each one is parsed into a `lectern::ObjectSchema` at startup;
//! a declaration the validator cannot express fails registry construction.
//!
//! Conventions:
//! - Every property node has an explicit `type`
//! - Use `type: ["T", "null"]` for fields that accept an explicit null
//! - `default` only on optional fields, applied when the field is absent

use serde_json::{json, Value};

pub fn ingest_content() -> Value {
    json!({
        "type": "object",
        "properties": {
            "raw_text": {
                "type": "string",
                "description": "Full text of the document to store"
            },
            "title": {
                "type": ["string", "null"],
                "description": "Human-readable title"
            },
            "source_url": {
                "type": ["string", "null"],
                "description": "Where the content came from"
            },
            "subject": {
                "type": "string",
                "description": "Subject area, e.g. 'physics'"
            },
            "tags": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Free-form labels for filtering"
            }
        },
        "required": ["raw_text"]
    })
}

pub fn search_content() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Search text"
            },
            "limit": {
                "type": ["number", "null"],
                "default": 5,
                "description": "Maximum number of results"
            },
            "subject": {
                "type": "string",
                "description": "Restrict results to one subject area"
            },
            "tags": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Only return content carrying all of these tags"
            }
        },
        "required": ["query"]
    })
}

pub fn log_completion_result() -> Value {
    json!({
        "type": "object",
        "properties": {
            "content_id": {
                "type": "string",
                "description": "ID of the content the attempt was about"
            },
            "outcome": {
                "type": "string",
                "enum": ["success", "fail"],
                "description": "How the attempt went"
            },
            "score": {
                "type": ["number", "null"],
                "description": "Optional numeric score"
            },
            "notes": {
                "type": ["string", "null"],
                "description": "Optional free-form notes"
            },
            "context": {
                "type": "object",
                "description": "Where the attempt happened",
                "properties": {
                    "session_id": { "type": "string" },
                    "attempt": {
                        "type": "integer",
                        "description": "1-based attempt number"
                    }
                }
            }
        },
        "required": ["content_id", "outcome"]
    })
}

pub fn service_info() -> Value {
    json!({
        "type": "object",
        "properties": {}
    })
}
