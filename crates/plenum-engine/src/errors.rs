//! Engine error taxonomy.

use plenum_minutes::MinutesError;
use plenum_store::StoreError;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by engine operations.
///
/// `StateConflict` and `VotingNotAllowed` are local and synchronous: the
/// action was rejected before any write and nothing changed. `Collaborator`
/// reports a minutes pipeline failure after a completed transition and never
/// implies a rollback.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The action is incompatible with the meeting's current status.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// The vote was rejected: item not voting-enabled or meeting not active.
    #[error("voting not allowed: {0}")]
    VotingNotAllowed(String),

    /// No meeting with this ID.
    #[error("meeting not found: {0}")]
    MeetingNotFound(String),

    /// No agenda item with this ID.
    #[error("agenda item not found: {0}")]
    AgendaItemNotFound(String),

    /// The participant is unknown to the directory.
    #[error("participant not found: {0}")]
    ParticipantNotFound(String),

    /// Persistence failed; the action was rejected wholesale.
    #[error("store error: {0}")]
    Store(StoreError),

    /// A minutes collaborator failed.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] MinutesError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MeetingNotFound(id) => Self::MeetingNotFound(id),
            other => Self::Store(other),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
