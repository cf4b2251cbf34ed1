//! # plenum-core
//!
//! Foundation types for the Plenum meeting engine.
//!
//! This crate provides the shared vocabulary that all other Plenum crates
//! depend on:
//!
//! - **Branded IDs**: `MeetingId`, `AgendaItemId`, `AttendanceId`, `VoteId`,
//!   `MessageId`, `ParticipantId` as newtypes for type safety
//! - **Domain enums**: `MeetingStatus`, `VoteValue`, `VoteOutcome`, `Role`
//!   as closed sets with stable wire strings
//! - **Tally**: vote counts per agenda item with outcome derivation
//! - **Entities**: `Meeting`, `AgendaItem`, `AttendanceRecord`, `Vote`,
//!   `ChatMessage` as they persist and travel over the wire
//! - **Room events**: `RoomEvent` variants broadcast to meeting rooms
//! - **Logging**: tracing subscriber initialization

#![deny(unsafe_code)]

pub mod constants;
pub mod events;
pub mod ids;
pub mod logging;
pub mod model;
pub mod types;

pub use events::{BaseEvent, RoomEvent};
pub use ids::{AgendaItemId, AttendanceId, MeetingId, MessageId, ParticipantId, VoteId};
pub use model::{AgendaItem, AttendanceRecord, ChatMessage, Meeting, Vote};
pub use types::{MeetingStatus, ParseEnumError, Role, Tally, VoteOutcome, VoteValue};
