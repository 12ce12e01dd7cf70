//! Session Management
//!
//! A session owns exactly one tool-provider connection and one conversation
//! store. It is created at process startup once the transport handshake has
//! succeeded, serves queries one at a time, and releases the transport at
//! shutdown. Concurrent sessions require independent instances; nothing here
//! is shared.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::conversation::{ConversationStore, TranscriptSink};
use crate::error::Result;
use crate::message::{ResultContent, Turn};
use crate::provider::LlmInvoker;
use crate::query::{QueryConfig, QueryLoop};
use crate::tool::{ToolDescriptor, ToolProvider};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One logical conversation bound to one tool provider and one LLM backend
pub struct Session {
    id: SessionId,
    conversation: ConversationStore,
    tools: Arc<dyn ToolProvider>,
    query: QueryLoop,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Create a session over an already-connected tool provider
    pub fn new(llm: Arc<dyn LlmInvoker>, tools: Arc<dyn ToolProvider>) -> Self {
        Self::with_config(llm, tools, QueryConfig::default(), None)
    }

    /// Create a session with an explicit loop config and optional transcript mirror
    pub fn with_config(
        llm: Arc<dyn LlmInvoker>,
        tools: Arc<dyn ToolProvider>,
        config: QueryConfig,
        sink: Option<Arc<dyn TranscriptSink>>,
    ) -> Self {
        let conversation = match sink {
            Some(sink) => ConversationStore::with_sink(sink),
            None => ConversationStore::new(),
        };
        Self {
            id: SessionId::new(),
            conversation,
            tools: tools.clone(),
            query: QueryLoop::new(llm, tools, config),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Resolve one query to a finished transcript
    ///
    /// Failures are scoped to the query: the store keeps the partial
    /// transcript (including any failure notice) and remains usable.
    pub async fn process_query(&mut self, query: &str) -> Result<Vec<Turn>> {
        self.query.resolve(&mut self.conversation, query).await
    }

    /// The tool catalog cached at connect time
    pub fn catalog(&self) -> &[ToolDescriptor] {
        self.tools.catalog()
    }

    /// Invoke a tool directly, bypassing the LLM entirely
    ///
    /// The call is not recorded in the conversation; it is a pass-through
    /// for the transport-facing API's direct-invocation endpoint.
    pub async fn call_tool(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<Vec<ResultContent>> {
        self.tools.call_tool(name, args).await
    }

    /// Accumulated conversation history
    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    /// Release the tool-provider transport
    pub async fn close(&self) -> Result<()> {
        tracing::info!(session = %self.id, "closing session transport");
        self.tools.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use async_trait::async_trait;

    struct EchoInvoker;

    #[async_trait]
    impl LlmInvoker for EchoInvoker {
        async fn invoke(&self, turns: &[Turn], _tools: &[ToolDescriptor]) -> Result<Turn> {
            Ok(Turn::assistant(format!("saw {} turns", turns.len())))
        }
    }

    struct ClosableProvider {
        catalog: Vec<ToolDescriptor>,
        closed: std::sync::Mutex<bool>,
    }

    #[async_trait]
    impl ToolProvider for ClosableProvider {
        fn catalog(&self) -> &[ToolDescriptor] {
            &self.catalog
        }

        async fn call_tool(
            &self,
            name: &str,
            _args: serde_json::Value,
        ) -> Result<Vec<ResultContent>> {
            Err(BridgeError::ToolExecution {
                tool: name.to_string(),
                message: "unknown tool".into(),
            })
        }

        async fn close(&self) -> Result<()> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_session_serves_sequential_queries() {
        let provider = Arc::new(ClosableProvider {
            catalog: Vec::new(),
            closed: std::sync::Mutex::new(false),
        });
        let mut session = Session::new(Arc::new(EchoInvoker), provider);

        let first = session.process_query("one").await.unwrap();
        let second = session.process_query("two").await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        // second query replays the first's turns
        assert_eq!(session.conversation().len(), 4);
        assert_eq!(second[1], Turn::assistant("saw 3 turns"));
    }

    #[tokio::test]
    async fn test_close_releases_transport() {
        let provider = Arc::new(ClosableProvider {
            catalog: Vec::new(),
            closed: std::sync::Mutex::new(false),
        });
        let session = Session::new(Arc::new(EchoInvoker), provider.clone());

        session.close().await.unwrap();
        assert!(*provider.closed.lock().unwrap());
    }

    #[tokio::test]
    async fn test_catalog_is_stable_across_queries() {
        let provider = Arc::new(ClosableProvider {
            catalog: vec![ToolDescriptor::new(
                "get_team_stats",
                "Team statistics lookup",
                serde_json::json!({"type": "object"}),
            )],
            closed: std::sync::Mutex::new(false),
        });
        let mut session = Session::new(Arc::new(EchoInvoker), provider);

        let before = session.catalog().to_vec();
        session.process_query("anything").await.unwrap();
        let after = session.catalog().to_vec();

        assert_eq!(before, after);
        assert_eq!(after.len(), 1);
    }

    #[tokio::test]
    async fn test_direct_tool_call_bypasses_conversation() {
        let provider = Arc::new(ClosableProvider {
            catalog: Vec::new(),
            closed: std::sync::Mutex::new(false),
        });
        let session = Session::new(Arc::new(EchoInvoker), provider);

        let err = session
            .call_tool("nope", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ToolExecution { .. }));
        assert!(session.conversation().is_empty());
    }
}
