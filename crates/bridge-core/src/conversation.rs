//! Conversation Store
//!
//! Ordered, append-only sequence of turns. The store doubles as the request
//! payload replayed to the LLM provider on every round trip, so it is never
//! reordered or compacted. Each append can be mirrored to a transcript sink
//! for debugging; sink failures are logged and never abort the conversation.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::message::Turn;

/// Receives the full snapshot after every append
///
/// Implementations persist the transcript as an audit artifact. There is no
/// read-back path; the store itself is the source of truth.
pub trait TranscriptSink: Send + Sync {
    fn persist(&self, turns: &[Turn]) -> Result<()>;
}

/// Append-only conversation history
#[derive(Default)]
pub struct ConversationStore {
    turns: Vec<Turn>,
    sink: Option<Arc<dyn TranscriptSink>>,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("turns", &self.turns)
            .field("mirrored", &self.sink.is_some())
            .finish()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that mirrors every append to `sink`
    pub fn with_sink(sink: Arc<dyn TranscriptSink>) -> Self {
        Self {
            turns: Vec::new(),
            sink: Some(sink),
        }
    }

    /// Append one turn to the end of the sequence
    ///
    /// No deduplication, no size bound; truncation is a caller concern. A
    /// failing sink is reported and otherwise ignored.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
        if let Some(sink) = &self.sink {
            if let Err(err) = sink.persist(&self.turns) {
                tracing::warn!(error = %err, "transcript persistence failed");
            }
        }
    }

    /// Full ordered sequence as of the call, safe to serialize independently
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Borrow the ordered sequence
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Writes each snapshot to a timestamp-named JSON file
pub struct FileTranscriptSink {
    dir: PathBuf,
}

impl FileTranscriptSink {
    /// Create a sink writing under `dir`, creating it if missing
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl TranscriptSink for FileTranscriptSink {
    fn persist(&self, turns: &[Turn]) -> Result<()> {
        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%f");
        let path = self.dir.join(format!("conversation_{stamp}.json"));
        let payload = serde_json::to_string_pretty(turns)?;
        std::fs::write(path, payload)?;
        Ok(())
    }
}
