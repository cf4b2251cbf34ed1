//! High-level `MeetingStore` API.
//!
//! The [`MeetingStore`] provides a transactional, meeting-centric API built on
//! top of the repository layer. Multi-row write operations are atomic: they
//! execute within a single `SQLite` transaction, so callers never see partial
//! state.

mod meeting_store;

pub use meeting_store::*;

pub use crate::sqlite::repositories::agenda::CreateAgendaItemOptions;
pub use crate::sqlite::repositories::meeting::{CreateMeetingOptions, UpdateMeetingFields};
pub use crate::sqlite::repositories::message::AppendMessageOptions;
pub use crate::sqlite::repositories::vote::CastVoteOptions;
