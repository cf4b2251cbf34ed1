//! # plenum-store
//!
//! `SQLite` persistence layer for the meeting system.
//!
//! Responsible for:
//!
//! - **Schema**: meetings, agenda items, attendance records, votes, and chat
//!   messages, with `CHECK`ed enum columns and the unique indexes that back
//!   the engine's idempotency guarantees
//! - **Repositories**: stateless structs, one per table, every method a pure
//!   function of `(&Connection, input)`
//! - **[`MeetingStore`]**: high-level transactional facade where multi-row
//!   writes (completion, vote upsert + tally) commit atomically or not at all
//! - **Migrations**: version-tracked SQL schema evolution, embedded at
//!   compile time

#![deny(unsafe_code)]

pub mod errors;
pub mod sqlite;
pub mod store;

pub use errors::{Result, StoreError};
pub use sqlite::{
    file_pool, memory_pool, run_migrations, ConnectionConfig, ConnectionPool, PooledConnection,
};
pub use store::{
    AgendaEntry, AppendMessageOptions, CastVoteOptions, CompletionResult,
    CreateAgendaItemOptions, CreateMeetingOptions, JoinOutcome, MeetingSnapshot, MeetingStore,
    UpdateMeetingFields,
};
