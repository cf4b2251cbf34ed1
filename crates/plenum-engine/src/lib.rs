//! # plenum-engine
//!
//! The authoritative coordinator for meeting state. One [`MeetingEngine`]
//! instance owns all room semantics in a process:
//!
//! - **Lifecycle**: `planned → active → completed`, with cancellation from
//!   the first two states. Transitions are compare-and-swap writes, so a
//!   stale caller gets a state conflict instead of clobbering progress.
//! - **Attendance**: idempotent joins, span-per-presence records, live
//!   counts, and quorum checks against the configured threshold.
//! - **Voting**: one ballot per participant per item, recast replaces, and
//!   every accepted ballot publishes a fresh tally to the room.
//! - **Agenda and chat**: status-gated mutation with room echo.
//! - **Minutes**: on completion a [`ProtocolAssembler`] gathers the record
//!   and drives the text and rendering collaborators from `plenum-minutes`.
//!
//! All work on one meeting serializes through [`MeetingLocks`], which is
//! what makes the event stream from [`MeetingEngine::subscribe_events`]
//! arrive in acceptance order. Participant identity comes from a
//! [`Directory`]; the shipped [`StaticDirectory`] is roster-backed.
//! [`ReminderSweep`] is the periodic upcoming-meeting reminder loop.

#![deny(unsafe_code)]

pub mod assembler;
pub mod engine;
pub mod errors;
pub mod identity;
pub mod locks;
pub mod reminders;

pub use assembler::ProtocolAssembler;
pub use engine::{
    AddAgendaItemRequest, CastVoteRequest, CreateMeetingRequest, EngineConfig, JoinAck,
    MeetingEngine, SendMessageRequest, UpdateMeetingRequest, VoteAck,
};
pub use errors::{EngineError, Result};
pub use identity::{Directory, Profile, StaticDirectory};
pub use locks::MeetingLocks;
pub use reminders::{LogNotifier, NotifyResult, ReminderNotifier, ReminderSweep};
