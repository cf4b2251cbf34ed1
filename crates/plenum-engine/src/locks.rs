//! Per-meeting serialization locks.
//!
//! Every engine action on one meeting runs under that meeting's async mutex,
//! held across validate, persist, publish. Actions on different meetings
//! never contend. The lock orders event publication; the store's SQL
//! constraints remain the safety net.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily-created lock per meeting ID. Locks are never removed; the map
/// grows with the number of meetings ever touched by this process.
#[derive(Debug, Default)]
pub struct MeetingLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl MeetingLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get (or create) the lock for a meeting.
    #[must_use]
    pub fn lock_for(&self, meeting_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(meeting_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire the meeting's lock, waiting if another action holds it.
    pub async fn hold(&self, meeting_id: &str) -> OwnedMutexGuard<()> {
        self.lock_for(meeting_id).lock_owned().await
    }

    /// Number of meetings with a lock entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
