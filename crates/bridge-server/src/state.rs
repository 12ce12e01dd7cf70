//! Application State

use std::sync::Arc;

use bridge_core::Session;
use tokio::sync::Mutex;

/// Shared application state
///
/// The session sits behind an async mutex: one conversation, one writer at a
/// time. Handlers that only read the cached catalog still go through it,
/// which is cheap enough and keeps the ownership story simple.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }
}
