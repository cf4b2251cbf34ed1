//! Liveness endpoint backing `GET /health`.

use std::time::Instant;

use serde::Serialize;

/// Liveness snapshot served at `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"ok"` whenever the process can answer at all.
    pub status: String,
    /// Whole seconds since boot.
    pub uptime_secs: u64,
    /// WebSocket connections currently open.
    pub connections: usize,
    /// Meeting rooms with at least one subscribed channel.
    pub rooms: usize,
}

impl HealthResponse {
    /// Snapshot the live counters.
    #[must_use]
    pub fn snapshot(started_at: Instant, connections: usize, rooms: usize) -> Self {
        Self {
            status: "ok".into(),
            uptime_secs: started_at.elapsed().as_secs(),
            connections,
            rooms,
        }
    }
}
