//! Shared state handed to every method handler.

use std::sync::Arc;
use std::time::Instant;

use plenum_engine::{Directory, MeetingEngine};

/// Dependencies a handler may need. Cheap to clone.
#[derive(Clone)]
pub struct RpcContext {
    /// The meeting engine; every domain action goes through it.
    pub engine: Arc<MeetingEngine>,
    /// Roster lookup for authorization and display names.
    pub directory: Arc<dyn Directory>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl RpcContext {
    /// Bundle the engine and directory into a context.
    pub fn new(engine: Arc<MeetingEngine>, directory: Arc<dyn Directory>) -> Self {
        Self {
            engine,
            directory,
            started_at: Instant::now(),
        }
    }
}
