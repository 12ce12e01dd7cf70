//! Error Types

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Bridge error types
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Tool-provider transport could not be established; fatal to session startup
    #[error("Connection error: {0}")]
    Connection(String),

    /// Tool catalog fetch failed during connect; fatal to session startup
    #[error("Tool discovery error: {0}")]
    ToolDiscovery(String),

    /// Operation attempted before a transport was connected
    #[error("Not connected to a tool provider")]
    NotConnected,

    /// A specific tool call failed; aborts the current query only
    #[error("Tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    /// LLM provider round trip failed; aborts the current query only
    #[error("LLM invocation error: {0}")]
    LlmInvocation(String),

    /// Assistant turn with no content blocks
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// A transport yielded a result content kind outside the supported set
    #[error("Unsupported tool result content: {0}")]
    UnsupportedContent(String),

    /// Query loop exceeded its round bound without reaching terminal text
    #[error("Query exceeded {0} tool rounds")]
    RoundLimit(usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for BridgeError {
    fn from(err: anyhow::Error) -> Self {
        BridgeError::Other(err.to_string())
    }
}

impl BridgeError {
    /// Whether the error is fatal to the whole session rather than one query
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::Connection(_) | BridgeError::ToolDiscovery(_)
        )
    }

    /// Convert to a message safe to surface to the transport-facing caller
    pub fn user_message(&self) -> String {
        match self {
            BridgeError::Connection(_) | BridgeError::ToolDiscovery(_) => {
                "The tool provider is unavailable.".into()
            }
            BridgeError::NotConnected => "No tool provider session is active.".into(),
            BridgeError::ToolExecution { tool, message } => {
                format!("Tool '{tool}' failed: {message}")
            }
            BridgeError::LlmInvocation(_) => {
                "The language model service encountered an error.".into()
            }
            BridgeError::RoundLimit(n) => {
                format!("The query did not settle within {n} tool rounds.")
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}
