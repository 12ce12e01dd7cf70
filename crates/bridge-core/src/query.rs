//! Query Loop
//!
//! Resolves one user query to a finished transcript: send the conversation
//! to the LLM, inspect the response, dispatch any requested tool calls
//! through the adapter, fold results back in, repeat until the model
//! produces a terminal text-only turn.

use std::sync::Arc;

use crate::conversation::ConversationStore;
use crate::error::{BridgeError, Result};
use crate::message::{ContentBlock, ResultContent, Turn, TurnContent};
use crate::provider::LlmInvoker;
use crate::tool::ToolProvider;

/// Query loop configuration
#[derive(Clone, Copy, Debug)]
pub struct QueryConfig {
    /// Maximum model round trips per query before giving up
    ///
    /// The conversation itself is unbounded; this only stops a model that
    /// keeps requesting tools without ever answering.
    pub max_rounds: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { max_rounds: 16 }
    }
}

/// Orchestrates one query against a connected session
pub struct QueryLoop {
    llm: Arc<dyn LlmInvoker>,
    tools: Arc<dyn ToolProvider>,
    config: QueryConfig,
}

impl QueryLoop {
    pub fn new(llm: Arc<dyn LlmInvoker>, tools: Arc<dyn ToolProvider>, config: QueryConfig) -> Self {
        Self { llm, tools, config }
    }

    pub fn with_defaults(llm: Arc<dyn LlmInvoker>, tools: Arc<dyn ToolProvider>) -> Self {
        Self::new(llm, tools, QueryConfig::default())
    }

    /// Resolve one user query, mutating the store and returning the turns
    /// accumulated during this query's resolution
    ///
    /// On a tool failure the failure notice is recorded in the store before
    /// the error propagates, so the partial transcript stays queryable. The
    /// store is never left mid-edit: every append is a complete turn, and
    /// subsequent queries can reuse the same store.
    pub async fn resolve(
        &self,
        conversation: &mut ConversationStore,
        query: &str,
    ) -> Result<Vec<Turn>> {
        let user_turn = Turn::user(query);
        conversation.append(user_turn.clone());
        let mut transcript = vec![user_turn];

        for _round in 0..self.config.max_rounds {
            let assistant = self
                .llm
                .invoke(conversation.turns(), self.tools.catalog())
                .await?;

            if let Some(blocks) = assistant.blocks() {
                if blocks.is_empty() {
                    return Err(BridgeError::MalformedResponse(
                        "assistant turn with zero content blocks".into(),
                    ));
                }
            }

            conversation.append(assistant.clone());
            transcript.push(assistant.clone());

            if assistant.is_terminal_text() {
                return Ok(transcript);
            }

            // Dispatch tool requests strictly in source order; later calls
            // may depend on earlier ones' side effects on the tool server.
            let TurnContent::Blocks(blocks) = assistant.content else {
                // Bare text is terminal and was returned above.
                continue;
            };

            for block in blocks {
                let ContentBlock::ToolUse { id, name, input } = block else {
                    // Text already lives in the stored assistant turn.
                    continue;
                };

                tracing::debug!(tool = %name, call_id = %id, "dispatching tool call");
                match self.tools.call_tool(&name, input).await {
                    Ok(content) => {
                        let result_turn = Turn::tool_result(&id, content);
                        conversation.append(result_turn.clone());
                        transcript.push(result_turn);
                    }
                    Err(err) => {
                        let notice = Turn::tool_result(
                            &id,
                            vec![ResultContent::text(format!(
                                "Tool execution failed: {err}"
                            ))],
                        );
                        conversation.append(notice.clone());
                        transcript.push(notice);
                        return Err(err);
                    }
                }
            }
        }

        Err(BridgeError::RoundLimit(self.config.max_rounds))
    }
}
