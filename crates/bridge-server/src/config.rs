//! Server Configuration

use std::path::PathBuf;

use bridge_core::error::{BridgeError, Result};

/// Which transport the session's tool provider uses
#[derive(Clone, Debug, PartialEq)]
pub enum McpTarget {
    /// Spawn a subprocess speaking MCP over stdio
    Stdio {
        command: String,
        args: Vec<String>,
        cwd: Option<PathBuf>,
    },
    /// Connect to a remote Streamable HTTP endpoint
    Http { url: String },
}

/// Process configuration, loaded from the environment
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub target: McpTarget,
    pub bind_addr: String,
    pub transcript_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` in disguise, testable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let transport = lookup("MCP_TRANSPORT").unwrap_or_else(|| "stdio".into());
        let target = match transport.as_str() {
            "stdio" => {
                let command = lookup("MCP_SERVER_COMMAND").ok_or_else(|| {
                    BridgeError::Config("MCP_SERVER_COMMAND is required for stdio transport".into())
                })?;
                let args = lookup("MCP_SERVER_ARGS")
                    .map(|raw| raw.split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default();
                let cwd = lookup("MCP_SERVER_CWD").map(PathBuf::from);
                McpTarget::Stdio { command, args, cwd }
            }
            "http" => {
                let url = lookup("MCP_SERVER_URL").ok_or_else(|| {
                    BridgeError::Config("MCP_SERVER_URL is required for http transport".into())
                })?;
                McpTarget::Http { url }
            }
            other => {
                return Err(BridgeError::Config(format!(
                    "MCP_TRANSPORT must be 'stdio' or 'http', got '{other}'"
                )));
            }
        };

        Ok(Self {
            target,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".into()),
            transcript_dir: lookup("TRANSCRIPT_DIR").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_stdio_target_with_args_and_cwd() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("MCP_SERVER_COMMAND", "python"),
            ("MCP_SERVER_ARGS", "server.py --verbose"),
            ("MCP_SERVER_CWD", "/srv/tools"),
        ]))
        .unwrap();

        assert_eq!(
            config.target,
            McpTarget::Stdio {
                command: "python".into(),
                args: vec!["server.py".into(), "--verbose".into()],
                cwd: Some(PathBuf::from("/srv/tools")),
            }
        );
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert!(config.transcript_dir.is_none());
    }

    #[test]
    fn test_http_target() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("MCP_TRANSPORT", "http"),
            ("MCP_SERVER_URL", "http://127.0.0.1:8080/mcp"),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ]))
        .unwrap();

        assert_eq!(
            config.target,
            McpTarget::Http {
                url: "http://127.0.0.1:8080/mcp".into()
            }
        );
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_stdio_requires_command() {
        assert!(ServerConfig::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_unknown_transport_is_rejected() {
        let result = ServerConfig::from_lookup(lookup(&[("MCP_TRANSPORT", "carrier-pigeon")]));
        assert!(result.is_err());
    }
}
