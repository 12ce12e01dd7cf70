//! Tool Provider Adapter
//!
//! Abstraction over the tool-providing transport. Concrete adapters (local
//! subprocess, remote HTTP) live in the runtime crate; the query loop only
//! sees this trait and never branches on transport kind.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::message::ResultContent;

/// A tool the provider exposes, in the shape the LLM catalog expects
///
/// Discovered once at connection time and cached for the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique within a session
    pub name: String,

    /// Human-readable description; empty when the provider gave none
    #[serde(default)]
    pub description: String,

    /// JSON Schema describing accepted arguments
    pub input_schema: serde_json::Value,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Normalize a raw catalog entry into a uniform descriptor
    ///
    /// Remote transports are loose about field names: the schema may appear
    /// under either `input_schema` or `inputSchema`, and the description may
    /// be missing entirely.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let name = value
            .get("name")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                BridgeError::ToolDiscovery("catalog entry without a name".into())
            })?
            .to_string();
        let description = value
            .get("description")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        let input_schema = value
            .get("input_schema")
            .or_else(|| value.get("inputSchema"))
            .cloned()
            .ok_or_else(|| {
                BridgeError::ToolDiscovery(format!("tool '{name}' has no input schema"))
            })?;

        Ok(Self {
            name,
            description,
            input_schema,
        })
    }
}

/// One connected tool-providing transport
///
/// Bound to a single transport for its whole lifetime; connecting is the
/// adapter constructor's job, so a value of this type is always connected.
/// `close` releases the transport (subprocess or HTTP session) and must be
/// called on every exit path.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// The catalog discovered at connect time
    ///
    /// Never re-queries or re-handshakes the transport.
    fn catalog(&self) -> &[ToolDescriptor];

    /// Invoke a tool by name with a structured argument map
    ///
    /// Results are normalized to the same logical shape regardless of
    /// transport. Tool-side failures surface as
    /// [`BridgeError::ToolExecution`] and are not retried.
    async fn call_tool(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<Vec<ResultContent>>;

    /// Release all transport resources
    async fn close(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_serializes_as_catalog_entry() {
        let descriptor = ToolDescriptor::new(
            "get_team_stats",
            "Team statistics lookup",
            json!({"type": "object", "properties": {"team": {"type": "string"}}}),
        );
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["name"], "get_team_stats");
        assert_eq!(value["description"], "Team statistics lookup");
        assert_eq!(value["input_schema"]["type"], "object");
    }

    #[test]
    fn test_from_value_accepts_both_schema_field_names() {
        let snake = json!({
            "name": "lookup",
            "description": "d",
            "input_schema": {"type": "object"}
        });
        let camel = json!({
            "name": "lookup",
            "description": "d",
            "inputSchema": {"type": "object"}
        });

        let a = ToolDescriptor::from_value(&snake).unwrap();
        let b = ToolDescriptor::from_value(&camel).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_value_defaults_missing_description() {
        let entry = json!({"name": "lookup", "input_schema": {"type": "object"}});
        let descriptor = ToolDescriptor::from_value(&entry).unwrap();
        assert_eq!(descriptor.description, "");
    }

    #[test]
    fn test_from_value_rejects_nameless_entry() {
        let entry = json!({"input_schema": {"type": "object"}});
        assert!(ToolDescriptor::from_value(&entry).is_err());
    }

    #[test]
    fn test_from_value_rejects_schemaless_entry() {
        let entry = json!({"name": "lookup"});
        assert!(ToolDescriptor::from_value(&entry).is_err());
    }
}
