//! Conversation Turns
//!
//! Wire-level message format shared between the conversation store and the
//! LLM provider. Turns serialize verbatim into the provider's request
//! payload, so the shapes here must match what the Messages API accepts.

use serde::{Deserialize, Serialize};

/// Role of a turn's author
///
/// Tool results ride in `User` turns per the provider contract; there is no
/// separate tool role on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input, including tool-result carrier turns
    User,
    /// Assistant (LLM) response
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single entry in a conversation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Turn role
    pub role: Role,

    /// Plain text or an ordered sequence of content blocks
    pub content: TurnContent,
}

/// Turn content, either a bare string or structured blocks
///
/// The provider accepts both shapes; responses always come back as blocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One content block inside a turn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text { text: String },

    /// The model asking for a tool invocation
    ToolUse {
        /// Opaque call identifier, echoed back in the paired result
        id: String,
        /// Tool name from the catalog
        name: String,
        /// Structured argument map
        input: serde_json::Value,
    },

    /// Outcome of a tool invocation, paired to its request by id
    ToolResult {
        tool_use_id: String,
        content: Vec<ResultContent>,
    },
}

/// A content item inside a tool result
///
/// Closed set: transports must normalize into one of these variants or fail
/// loudly. No silent stringification of unknown shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultContent {
    Text { text: String },
}

impl ResultContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

impl Turn {
    /// Create a plain-text user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    /// Create a plain-text assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text(text.into()),
        }
    }

    /// Create an assistant turn from raw content blocks
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Blocks(blocks),
        }
    }

    /// Create a tool-result carrier turn referencing `tool_use_id`
    pub fn tool_result(tool_use_id: impl Into<String>, content: Vec<ResultContent>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content,
            }]),
        }
    }

    /// Content blocks of this turn, if structured
    pub fn blocks(&self) -> Option<&[ContentBlock]> {
        match &self.content {
            TurnContent::Blocks(blocks) => Some(blocks),
            TurnContent::Text(_) => None,
        }
    }

    /// Whether the turn is a single text block (or bare text)
    pub fn is_terminal_text(&self) -> bool {
        match &self.content {
            TurnContent::Text(_) => true,
            TurnContent::Blocks(blocks) => {
                blocks.len() == 1 && matches!(blocks[0], ContentBlock::Text { .. })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_turn_wire_shape() {
        let turn = Turn::user("Hello");
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "Hello"}));
    }

    #[test]
    fn test_tool_use_block_wire_shape() {
        let block = ContentBlock::ToolUse {
            id: "toolu_01".into(),
            name: "get_team_stats".into(),
            input: json!({"team": "Argentina"}),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "tool_use",
                "id": "toolu_01",
                "name": "get_team_stats",
                "input": {"team": "Argentina"}
            })
        );
    }

    #[test]
    fn test_tool_result_turn_wire_shape() {
        let turn = Turn::tool_result("toolu_01", vec![ResultContent::text("{\"goals\":10}")]);
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": "toolu_01",
                    "content": [{"type": "text", "text": "{\"goals\":10}"}]
                }]
            })
        );
    }

    #[test]
    fn test_round_trip_preserves_block_order() {
        let turn = Turn::assistant_blocks(vec![
            ContentBlock::Text {
                text: "Checking".into(),
            },
            ContentBlock::ToolUse {
                id: "toolu_01".into(),
                name: "lookup".into(),
                input: json!({}),
            },
        ]);
        let serialized = serde_json::to_string(&turn).unwrap();
        let restored: Turn = serde_json::from_str(&serialized).unwrap();
        assert_eq!(restored, turn);
    }

    #[test]
    fn test_terminal_text_detection() {
        assert!(Turn::assistant("done").is_terminal_text());
        assert!(
            Turn::assistant_blocks(vec![ContentBlock::Text { text: "done".into() }])
                .is_terminal_text()
        );
        assert!(
            !Turn::assistant_blocks(vec![
                ContentBlock::Text { text: "hold on".into() },
                ContentBlock::ToolUse {
                    id: "toolu_01".into(),
                    name: "lookup".into(),
                    input: json!({}),
                },
            ])
            .is_terminal_text()
        );
    }
}
