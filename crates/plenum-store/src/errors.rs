//! Failure surface of the persistence layer.
//!
//! Everything under `plenum_store` funnels into [`StoreError`]. Callers mostly
//! care about one distinction: [`StoreError::MeetingNotFound`] is a caller
//! mistake, the rest mean the database itself misbehaved.

use thiserror::Error;

/// Convenience alias used throughout the store.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors produced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying `SQLite` call failed.
    #[error("sqlite failure: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No connection could be checked out of the pool.
    #[error("connection pool exhausted: {0}")]
    Pool(#[from] r2d2::Error),

    /// A schema migration did not apply cleanly.
    #[error("schema migration failed: {message}")]
    Migration {
        /// Which migration failed and why.
        message: String,
    },

    /// No meeting row with this ID.
    #[error("meeting not found: {0}")]
    MeetingNotFound(String),

    /// A store invariant broke mid-operation (e.g. an upserted row vanished).
    #[error("internal store error: {0}")]
    Internal(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
