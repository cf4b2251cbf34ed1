//! Identity collaborator: participant lookup and roles.

use std::collections::HashMap;

use async_trait::async_trait;

use plenum_core::Role;

/// What the directory knows about a participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    /// Human-readable name shown in events and minutes.
    pub display_name: String,
    /// Directory role.
    pub role: Role,
}

impl Profile {
    /// Whether this participant may create, run, and vote in meetings.
    #[must_use]
    pub fn is_founder(&self) -> bool {
        self.role == Role::Founder
    }
}

/// Resolves participant IDs to profiles.
///
/// Implementors must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Look up a participant. `None` means the ID is unknown.
    async fn lookup(&self, participant_id: &str) -> Option<Profile>;
}

/// In-memory directory backed by a fixed roster.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    entries: HashMap<String, Profile>,
}

impl StaticDirectory {
    /// Build a directory from `(participant_id, profile)` pairs.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Profile)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Number of known participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn lookup(&self, participant_id: &str) -> Option<Profile> {
        self.entries.get(participant_id).cloned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
