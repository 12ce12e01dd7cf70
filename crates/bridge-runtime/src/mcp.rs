//! MCP Tool Provider
//!
//! `ToolProvider` implementation over the official `rmcp` SDK. Two transports
//! share one connected type: a local child process speaking the protocol over
//! stdio, or a remote server over Streamable HTTP. Connecting performs the
//! handshake and caches the tool catalog; the query loop never learns which
//! transport served a call.

use std::path::Path;

use bridge_core::{
    error::{BridgeError, Result},
    message::ResultContent,
    tool::{ToolDescriptor, ToolProvider},
};

use async_trait::async_trait;
use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParams, ClientCapabilities, ClientInfo, Implementation},
    service::RunningService,
    transport::{ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess},
};
use tokio::process::Command;
use tokio::sync::Mutex;

type McpClient = RunningService<RoleClient, ClientInfo>;

/// One connected MCP transport plus its cached catalog
pub struct McpToolProvider {
    client: Mutex<Option<McpClient>>,
    catalog: Vec<ToolDescriptor>,
}

impl McpToolProvider {
    /// Spawn a local tool-provider subprocess and connect over stdio
    ///
    /// The child inherits this process's environment and runs in `cwd` when
    /// one is given. The handshake and catalog fetch happen before this
    /// returns; any failure tears the child down again.
    pub async fn connect_stdio(
        command: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<Self> {
        tracing::info!(command = %command, "spawning MCP server subprocess");
        let transport = TokioChildProcess::new(Command::new(command).configure(|cmd| {
            cmd.args(args);
            if let Some(cwd) = cwd {
                cmd.current_dir(cwd);
            }
        }))
        .map_err(|e| BridgeError::Connection(e.to_string()))?;

        let client = Self::client_info()
            .serve(transport)
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        Self::finish_connect(client).await
    }

    /// Open a persistent Streamable HTTP session against `url`
    pub async fn connect_http(url: &str) -> Result<Self> {
        tracing::info!(url = %url, "connecting to remote MCP server");
        let transport = StreamableHttpClientTransport::from_uri(url);

        let client = Self::client_info()
            .serve(transport)
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        Self::finish_connect(client).await
    }

    fn client_info() -> ClientInfo {
        ClientInfo {
            meta: None,
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: "toolbridge".to_string(),
                title: Some("toolbridge".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
                icons: None,
            },
        }
    }

    /// Fetch and normalize the catalog; release the transport on failure
    async fn finish_connect(client: McpClient) -> Result<Self> {
        match Self::discover(&client).await {
            Ok(catalog) => {
                tracing::info!(tools = catalog.len(), "discovered tool catalog");
                Ok(Self {
                    client: Mutex::new(Some(client)),
                    catalog,
                })
            }
            Err(err) => {
                let _ = client.cancel().await;
                Err(err)
            }
        }
    }

    /// One catalog fetch; either the full list normalizes or the whole
    /// discovery fails
    async fn discover(client: &McpClient) -> Result<Vec<ToolDescriptor>> {
        let listing = client
            .list_tools(Default::default())
            .await
            .map_err(|e| BridgeError::ToolDiscovery(e.to_string()))?;

        listing
            .tools
            .into_iter()
            .map(|tool| {
                let value = serde_json::to_value(&tool)
                    .map_err(|e| BridgeError::ToolDiscovery(e.to_string()))?;
                ToolDescriptor::from_value(&value)
            })
            .collect()
    }
}

/// Coerce a raw `tools/call` result into the bridge's content model
///
/// Works on the serialized payload so both transports funnel through the
/// same shape checks. A result flagged `isError` becomes a tool failure;
/// content items outside the supported set are rejected, not stringified.
fn normalize_result(value: &serde_json::Value, tool: &str) -> Result<Vec<ResultContent>> {
    let items = value
        .get("content")
        .and_then(serde_json::Value::as_array)
        .cloned()
        .unwrap_or_default();

    let is_error = value
        .get("isError")
        .or_else(|| value.get("is_error"))
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);
    if is_error {
        let message = items
            .iter()
            .find_map(|item| item.get("text").and_then(serde_json::Value::as_str))
            .unwrap_or("tool reported an error")
            .to_string();
        return Err(BridgeError::ToolExecution {
            tool: tool.to_string(),
            message,
        });
    }

    items
        .into_iter()
        .map(|item| {
            let kind = item
                .get("type")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string();
            match kind.as_str() {
                "text" => {
                    let text = item
                        .get("text")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or_default();
                    Ok(ResultContent::text(text))
                }
                other => Err(BridgeError::UnsupportedContent(format!(
                    "tool '{tool}' returned a '{other}' content item"
                ))),
            }
        })
        .collect()
}

#[async_trait]
impl ToolProvider for McpToolProvider {
    fn catalog(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    async fn call_tool(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<Vec<ResultContent>> {
        let guard = self.client.lock().await;
        let client = guard.as_ref().ok_or(BridgeError::NotConnected)?;

        tracing::debug!(tool = %name, "calling MCP tool");
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: args.as_object().cloned(),
            task: None,
        };

        let result = client.call_tool(params).await.map_err(|e| {
            BridgeError::ToolExecution {
                tool: name.to_string(),
                message: e.to_string(),
            }
        })?;

        let value = serde_json::to_value(&result)?;
        normalize_result(&value, name)
    }

    async fn close(&self) -> Result<()> {
        let client = self.client.lock().await.take();
        if let Some(client) = client {
            tracing::info!("shutting down MCP transport");
            client
                .cancel()
                .await
                .map_err(|e| BridgeError::Connection(e.to_string()))?;
        }
        Ok(())
    }
}
