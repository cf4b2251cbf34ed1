//! Domain entities as they persist and travel over the wire.
//!
//! Timestamps are RFC 3339 strings in UTC; the store writes them with
//! `chrono::Utc::now().to_rfc3339()` and comparisons stay lexicographic.
//! Serialization is camelCase to match the RPC surface.

use serde::{Deserialize, Serialize};

use crate::ids::{AgendaItemId, AttendanceId, MeetingId, MessageId, ParticipantId, VoteId};
use crate::types::{MeetingStatus, VoteValue};

/// A governance meeting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    /// Meeting ID (`mtg_` prefix).
    pub id: MeetingId,
    /// Meeting title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Scheduled start, RFC 3339.
    pub scheduled_for: String,
    /// Participant who created the meeting.
    pub creator_id: ParticipantId,
    /// Lifecycle status.
    pub status: MeetingStatus,
    /// URL of the rendered protocol document, set after minutes generation.
    pub protocol_url: Option<String>,
    /// Whether the upcoming-meeting reminder has been sent.
    pub reminder_sent: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
}

/// An item on a meeting's agenda.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    /// Agenda item ID (`item_` prefix).
    pub id: AgendaItemId,
    /// Owning meeting.
    pub meeting_id: MeetingId,
    /// Item title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Position within the agenda (unique per meeting, gap-tolerant).
    pub position: i64,
    /// Whether this item is put to a vote.
    pub requires_voting: bool,
    /// Creation timestamp.
    pub created_at: String,
}

/// One span of presence in a meeting. `left_at = None` means currently
/// present; re-joining after leaving creates a new record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Attendance record ID (`att_` prefix).
    pub id: AttendanceId,
    /// Owning meeting.
    pub meeting_id: MeetingId,
    /// The participant present.
    pub participant_id: ParticipantId,
    /// When the participant joined.
    pub joined_at: String,
    /// When the participant left, if they have.
    pub left_at: Option<String>,
}

impl AttendanceRecord {
    /// Whether the participant is currently present.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.left_at.is_none()
    }
}

/// A ballot cast on an agenda item. At most one row per (item, voter);
/// re-casting replaces value, comment, and timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Vote ID (`vote_` prefix).
    pub id: VoteId,
    /// Agenda item voted on.
    pub agenda_item_id: AgendaItemId,
    /// Who cast the ballot.
    pub voter_id: ParticipantId,
    /// The ballot value.
    pub value: VoteValue,
    /// Optional comment attached to the ballot.
    pub comment: Option<String>,
    /// When the ballot was (last) cast.
    pub cast_at: String,
}

/// A chat message in a meeting room. Append-only; ordering is by
/// `created_at`, ties broken by `seq`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message ID (`msg_` prefix).
    pub id: MessageId,
    /// Owning meeting.
    pub meeting_id: MeetingId,
    /// Sender.
    pub sender_id: ParticipantId,
    /// Message body.
    pub content: String,
    /// Send timestamp.
    pub created_at: String,
    /// Monotonic insertion sequence within the store.
    pub seq: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
