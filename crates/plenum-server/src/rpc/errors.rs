//! Wire error codes and the RPC error type.
//!
//! Engine errors convert here into their stable wire codes. Store and
//! other internal failures are sanitized at conversion time so raw error
//! text never leaves the process.

use plenum_engine::EngineError;
use thiserror::Error;
use tracing::error;

use crate::rpc::types::RpcErrorBody;

/// Request params missing, malformed, or out of bounds.
pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
/// No handler registered for the method.
pub const METHOD_NOT_FOUND: &str = "METHOD_NOT_FOUND";
/// Handler panicked, timed out, or failed to encode.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
/// The acting participant lacks the founder role.
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
/// The action is incompatible with the meeting's current status.
pub const STATE_CONFLICT: &str = "STATE_CONFLICT";
/// Ballot rejected: meeting not active or item not voting-enabled.
pub const VOTING_NOT_ALLOWED: &str = "VOTING_NOT_ALLOWED";
/// No meeting with the given id.
pub const MEETING_NOT_FOUND: &str = "MEETING_NOT_FOUND";
/// No agenda item with the given id.
pub const AGENDA_ITEM_NOT_FOUND: &str = "AGENDA_ITEM_NOT_FOUND";
/// The participant is not on the roster.
pub const PARTICIPANT_NOT_FOUND: &str = "PARTICIPANT_NOT_FOUND";
/// A write could not be persisted; nothing was applied.
pub const PERSISTENCE_FAILURE: &str = "PERSISTENCE_FAILURE";
/// A minutes collaborator failed; meeting state is unaffected.
pub const COLLABORATOR_FAILURE: &str = "COLLABORATOR_FAILURE";

/// An error produced while handling an RPC request.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Bad request parameters.
    #[error("{message}")]
    InvalidParams {
        /// What was wrong with the params.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{message}")]
    NotFound {
        /// Which not-found family, e.g. [`MEETING_NOT_FOUND`].
        code: &'static str,
        /// Description including the missing id.
        message: String,
    },

    /// The acting participant is not allowed to do this.
    #[error("{message}")]
    PermissionDenied {
        /// Who was rejected and why.
        message: String,
    },

    /// The action was rejected by a domain rule.
    #[error("{message}")]
    Conflict {
        /// [`STATE_CONFLICT`] or [`VOTING_NOT_ALLOWED`].
        code: &'static str,
        /// Which rule rejected it.
        message: String,
    },

    /// A downstream dependency failed.
    #[error("{message}")]
    Failure {
        /// [`PERSISTENCE_FAILURE`] or [`COLLABORATOR_FAILURE`].
        code: &'static str,
        /// Sanitized description.
        message: String,
    },

    /// Something unexpected happened inside the server.
    #[error("{message}")]
    Internal {
        /// Generic description, safe for the wire.
        message: String,
    },
}

impl RpcError {
    /// Shorthand for an [`INVALID_PARAMS`] error.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// The stable wire code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParams { .. } => INVALID_PARAMS,
            Self::NotFound { code, .. } | Self::Conflict { code, .. } | Self::Failure { code, .. } => {
                code
            }
            Self::PermissionDenied { .. } => PERMISSION_DENIED,
            Self::Internal { .. } => INTERNAL_ERROR,
        }
    }

    /// Convert to the wire body.
    #[must_use]
    pub fn to_error_body(&self) -> RpcErrorBody {
        RpcErrorBody::new(self.code(), self.to_string())
    }
}

impl From<EngineError> for RpcError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::StateConflict(message) => Self::Conflict {
                code: STATE_CONFLICT,
                message,
            },
            EngineError::VotingNotAllowed(message) => Self::Conflict {
                code: VOTING_NOT_ALLOWED,
                message,
            },
            EngineError::MeetingNotFound(id) => Self::NotFound {
                code: MEETING_NOT_FOUND,
                message: format!("meeting '{id}' not found"),
            },
            EngineError::AgendaItemNotFound(id) => Self::NotFound {
                code: AGENDA_ITEM_NOT_FOUND,
                message: format!("agenda item '{id}' not found"),
            },
            EngineError::ParticipantNotFound(id) => Self::NotFound {
                code: PARTICIPANT_NOT_FOUND,
                message: format!("participant '{id}' is not on the roster"),
            },
            EngineError::Store(store_err) => {
                // Detail stays in the log; the wire gets a fixed message.
                error!(error = %store_err, "store failure while handling rpc request");
                Self::Failure {
                    code: PERSISTENCE_FAILURE,
                    message: "the action could not be persisted and was not applied".to_string(),
                }
            }
            EngineError::Collaborator(minutes_err) => Self::Failure {
                code: COLLABORATOR_FAILURE,
                message: format!(
                    "minutes collaborator failed ({}); meeting state is unchanged",
                    minutes_err.category()
                ),
            },
        }
    }
}
