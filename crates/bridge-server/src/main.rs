//! toolbridge HTTP Server
//!
//! Axum-based server bridging natural-language queries to an MCP tool
//! provider through the Anthropic Messages API. One process hosts one
//! session: the MCP transport is connected at startup, its catalog cached,
//! and every query runs through the same conversation store.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bridge_core::{FileTranscriptSink, QueryConfig, Session, ToolProvider, TranscriptSink};
use bridge_runtime::{AnthropicInvoker, McpToolProvider};

use crate::config::{McpTarget, ServerConfig};
use crate::handlers::{call_tool, health_check, list_tools, process_query};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env()?;

    // Connect the tool provider; unreachable transport or a failed catalog
    // fetch is fatal, the process serves nothing without it
    let provider = match &config.target {
        McpTarget::Stdio { command, args, cwd } => {
            McpToolProvider::connect_stdio(command, args, cwd.as_deref()).await?
        }
        McpTarget::Http { url } => McpToolProvider::connect_http(url).await?,
    };
    let provider = Arc::new(provider);

    tracing::info!("Connected to MCP server, {} tools:", provider.catalog().len());
    for tool in provider.catalog() {
        tracing::info!("  • {}", tool.name);
    }

    // LLM backend
    let invoker = Arc::new(AnthropicInvoker::from_env()?);

    // Optional transcript mirroring
    let sink: Option<Arc<dyn TranscriptSink>> = match &config.transcript_dir {
        Some(dir) => Some(Arc::new(FileTranscriptSink::new(dir)?)),
        None => None,
    };

    let session = Session::with_config(invoker, provider, QueryConfig::default(), sink);
    tracing::info!(session = %session.id(), "session ready");
    let state = AppState::new(session);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/query", post(process_query))
        .route("/tools", get(list_tools))
        .route("/tool", post(call_tool))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("toolbridge server running on http://{}", config.bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health - Health check");
    tracing::info!("  POST /query  - Resolve a query to a transcript");
    tracing::info!("  GET  /tools  - Cached tool catalog");
    tracing::info!("  POST /tool   - Invoke a tool directly");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release the MCP transport on the way out
    let session = state.session.lock().await;
    if let Err(err) = session.close().await {
        tracing::warn!(error = %err, "transport shutdown failed");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
    }
}
