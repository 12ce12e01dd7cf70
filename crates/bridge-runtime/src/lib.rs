//! # bridge-runtime
//!
//! Concrete providers behind the `bridge-core` traits: the Anthropic
//! Messages API invoker and the MCP tool adapter (stdio subprocess or
//! Streamable HTTP).

pub mod anthropic;
pub mod mcp;

pub use anthropic::{AnthropicConfig, AnthropicInvoker};
pub use mcp::McpToolProvider;
