//! Anthropic LLM Invoker
//!
//! Implementation of `LlmInvoker` against the Anthropic Messages API. One
//! request per invocation, no retries, no streaming; the conversation store
//! serializes directly into the request's `messages` array.

use bridge_core::{
    error::{BridgeError, Result},
    message::{ContentBlock, Role, Turn, TurnContent},
    provider::LlmInvoker,
    tool::ToolDescriptor,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic provider configuration
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// API key sent in the `x-api-key` header
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Output token cap per round trip
    pub max_tokens: u32,

    /// API origin, overridable for tests and proxies
    pub base_url: String,
}

impl AnthropicConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| BridgeError::Config("ANTHROPIC_API_KEY is not set".into()))?;
        let model =
            std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| "claude-opus-5".into());
        let max_tokens = std::env::var("ANTHROPIC_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4096);
        let base_url = std::env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".into());

        Ok(Self {
            api_key,
            model,
            max_tokens,
            base_url,
        })
    }
}

/// Anthropic Messages API invoker
pub struct AnthropicInvoker {
    client: reqwest::Client,
    config: AnthropicConfig,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Turn],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [ToolDescriptor],
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

impl AnthropicInvoker {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(AnthropicConfig::from_env()?))
    }

    /// Map raw response content into the bridge block model
    ///
    /// The provider may emit block kinds beyond text and tool_use (thinking
    /// blocks, for one); those carry nothing the loop acts on and are dropped
    /// here rather than replayed.
    fn parse_content(raw: Vec<serde_json::Value>) -> Result<Vec<ContentBlock>> {
        let mut blocks = Vec::with_capacity(raw.len());
        for value in raw {
            let kind = value
                .get("type")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            match kind {
                "text" | "tool_use" => {
                    blocks.push(serde_json::from_value(value)?);
                }
                other => {
                    tracing::debug!(kind = %other, "dropping provider content block");
                }
            }
        }
        Ok(blocks)
    }
}

#[async_trait]
impl LlmInvoker for AnthropicInvoker {
    async fn invoke(&self, turns: &[Turn], tools: &[ToolDescriptor]) -> Result<Turn> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: turns,
            tools,
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| BridgeError::LlmInvocation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| {
                    format!("{}: {}", envelope.error.kind, envelope.error.message)
                })
                .unwrap_or(body);
            return Err(BridgeError::LlmInvocation(format!("{status}: {detail}")));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::LlmInvocation(e.to_string()))?;
        let blocks = Self::parse_content(body.content)?;
        if blocks.is_empty() {
            return Err(BridgeError::MalformedResponse(
                "provider returned no usable content blocks".into(),
            ));
        }

        Ok(Turn {
            role: Role::Assistant,
            content: TurnContent::Blocks(blocks),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_replays_turns_verbatim() {
        let turns = vec![
            Turn::user("stats please"),
            Turn::assistant_blocks(vec![ContentBlock::ToolUse {
                id: "toolu_01".into(),
                name: "get_team_stats".into(),
                input: json!({"team": "Argentina"}),
            }]),
        ];
        let tools = vec![ToolDescriptor::new(
            "get_team_stats",
            "Team statistics lookup",
            json!({"type": "object"}),
        )];
        let request = MessagesRequest {
            model: "claude-opus-5",
            max_tokens: 4096,
            messages: &turns,
            tools: &tools,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "claude-opus-5");
        assert_eq!(value["messages"][0]["content"], "stats please");
        assert_eq!(value["messages"][1]["content"][0]["type"], "tool_use");
        assert_eq!(value["tools"][0]["name"], "get_team_stats");
        assert_eq!(value["tools"][0]["input_schema"]["type"], "object");
    }

    #[test]
    fn test_request_body_omits_empty_catalog() {
        let turns = vec![Turn::user("hi")];
        let request = MessagesRequest {
            model: "claude-opus-5",
            max_tokens: 4096,
            messages: &turns,
            tools: &[],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_parse_content_keeps_text_and_tool_use_in_order() {
        let raw = vec![
            json!({"type": "text", "text": "Let me check."}),
            json!({"type": "tool_use", "id": "toolu_01", "name": "lookup", "input": {}}),
        ];
        let blocks = AnthropicInvoker::parse_content(raw).unwrap();

        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], ContentBlock::Text { .. }));
        assert!(matches!(blocks[1], ContentBlock::ToolUse { .. }));
    }

    #[test]
    fn test_parse_content_drops_foreign_block_kinds() {
        let raw = vec![
            json!({"type": "thinking", "thinking": "", "signature": "sig"}),
            json!({"type": "text", "text": "Answer."}),
        ];
        let blocks = AnthropicInvoker::parse_content(raw).unwrap();

        assert_eq!(
            blocks,
            vec![ContentBlock::Text {
                text: "Answer.".into()
            }]
        );
    }

    #[test]
    fn test_error_envelope_parses() {
        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"bad"}}"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.kind, "invalid_request_error");
        assert_eq!(envelope.error.message, "bad");
    }
}
