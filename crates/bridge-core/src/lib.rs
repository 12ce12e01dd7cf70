//! # bridge-core
//!
//! Core of the conversational bridge: a query loop that shuttles a
//! conversation between an LLM provider and an externally-discovered tool
//! catalog until the model settles on a text answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Session                               │
//! │  ┌────────────┐  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │   Query    │  │ Conversation │  │  LlmInvoker          │  │
//! │  │   Loop     │──│    Store     │──│  ToolProvider        │  │
//! │  └────────────┘  └──────────────┘  └──────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmInvoker` and `ToolProvider` traits keep the loop ignorant of the
//! concrete model backend and of whether tools are served by a local
//! subprocess or a remote HTTP endpoint.

pub mod conversation;
pub mod error;
pub mod message;
pub mod provider;
pub mod query;
pub mod session;
pub mod tool;

pub use conversation::{ConversationStore, FileTranscriptSink, TranscriptSink};
pub use error::{BridgeError, Result};
pub use message::{ContentBlock, ResultContent, Role, Turn, TurnContent};
pub use provider::LlmInvoker;
pub use query::{QueryConfig, QueryLoop};
pub use session::{Session, SessionId};
pub use tool::{ToolDescriptor, ToolProvider};
