//! Error surface shared by the minutes collaborators.

use reqwest::StatusCode;

/// Alias used by both collaborator clients.
pub type Result<T> = std::result::Result<T, MinutesError>;

/// A failed exchange with the text or render service.
///
/// The `retryable` flag on [`MinutesError::Api`] comes from the service's
/// own error body when it provides one; transport-level retryability is
/// derived in [`MinutesError::is_retryable`].
#[derive(Debug, thiserror::Error)]
pub enum MinutesError {
    /// The request never produced a usable response.
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),

    /// A body that should have been JSON could not be decoded.
    #[error("decoding response: {0}")]
    Json(#[from] serde_json::Error),

    /// The service rejected our credentials.
    #[error("authentication rejected: {message}")]
    Auth {
        /// Detail from the service, never the key itself.
        message: String,
    },

    /// The service answered with an error status.
    #[error("service error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Detail from the error body.
        message: String,
        /// Whether the service marked the failure as transient.
        retryable: bool,
    },

    /// A 2xx response whose payload was missing the part we need.
    #[error("unusable response: {message}")]
    Malformed {
        /// What was missing or wrong.
        message: String,
    },
}

impl MinutesError {
    /// True when retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || matches!(
                        e.status(),
                        Some(s) if s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
                    )
            }
            Self::Api { retryable, .. } => *retryable,
            Self::Json(_) | Self::Auth { .. } | Self::Malformed { .. } => false,
        }
    }

    /// Coarse label used in logs and metric labels.
    pub fn category(&self) -> &str {
        match self {
            Self::Http(_) => "transport",
            Self::Json(_) | Self::Malformed { .. } => "decode",
            Self::Auth { .. } => "auth",
            Self::Api { .. } => "api",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
