//! LLM Invoker
//!
//! One synchronous round trip to the model provider. The invoker is a pure
//! function of the conversation and the tool catalog plus the provider's
//! nondeterminism; it keeps no state between calls and never retries.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Turn;
use crate::tool::ToolDescriptor;

/// Strategy trait for LLM providers
///
/// Implement this to add a new model backend. The query loop works
/// exclusively through this interface.
#[async_trait]
pub trait LlmInvoker: Send + Sync {
    /// Send the full turn sequence plus the tool catalog, get one assistant turn
    ///
    /// The returned turn carries either a single text block or an ordered mix
    /// of text and tool-use blocks. Transport or provider-side failures
    /// surface as [`crate::error::BridgeError::LlmInvocation`]; retry policy,
    /// if any, belongs to the caller.
    async fn invoke(&self, turns: &[Turn], tools: &[ToolDescriptor]) -> Result<Turn>;
}
