//! Wire types for a tools-only MCP server (protocol revision 2025-06-18).
//!
//! - `jsonrpc` - envelopes and request ids
//! - `error` - error data with standard JSON-RPC codes
//! - `protocol` - initialize handshake and capabilities
//! - `tool` - tool definitions and call results
//! - `content` - content blocks carried in tool results

pub mod content;
pub mod error;
pub mod jsonrpc;
pub mod protocol;
pub mod tool;

pub use content::Content;
pub use error::ErrorData;
