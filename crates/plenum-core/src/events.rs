//! Room events broadcast to connected meeting participants.
//!
//! Every engine operation that changes what a room can see publishes exactly
//! one [`RoomEvent`]. Payloads are self-sufficient (display names, counts,
//! tally snapshots) so clients update without a follow-up fetch. Clients rely
//! on the exact type strings and field names.

use serde::{Deserialize, Serialize};

use crate::ids::{AgendaItemId, MeetingId, MessageId, ParticipantId};
use crate::types::{Tally, VoteOutcome};

/// Common fields for all room events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseEvent {
    /// Meeting this event belongs to.
    pub meeting_id: MeetingId,
    /// RFC 3339 timestamp, millisecond precision.
    pub timestamp: String,
}

impl BaseEvent {
    /// Stamp the base fields with the current UTC time.
    #[must_use]
    pub fn now(meeting_id: MeetingId) -> Self {
        Self {
            meeting_id,
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Events delivered to every channel subscribed to a meeting's room,
/// in engine-acceptance order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoomEvent {
    /// A participant joined the meeting.
    #[serde(rename = "participant-joined")]
    ParticipantJoined {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Who joined.
        #[serde(rename = "participantId")]
        participant_id: ParticipantId,
        /// Display name resolved through the directory.
        #[serde(rename = "displayName")]
        display_name: String,
        /// Open attendance count after the join.
        #[serde(rename = "attendeeCount")]
        attendee_count: i64,
    },

    /// A participant left the meeting.
    #[serde(rename = "participant-left")]
    ParticipantLeft {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Who left.
        #[serde(rename = "participantId")]
        participant_id: ParticipantId,
        /// Display name resolved through the directory.
        #[serde(rename = "displayName")]
        display_name: String,
        /// Open attendance count after the leave.
        #[serde(rename = "attendeeCount")]
        attendee_count: i64,
    },

    /// A chat message was persisted. Echoes to all channels, sender included.
    #[serde(rename = "chat-message")]
    ChatMessage {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Persisted message ID.
        #[serde(rename = "messageId")]
        message_id: MessageId,
        /// Sender.
        #[serde(rename = "senderId")]
        sender_id: ParticipantId,
        /// Sender display name.
        #[serde(rename = "senderName")]
        sender_name: String,
        /// Message body.
        content: String,
    },

    /// An agenda item was added.
    #[serde(rename = "agenda-item-added")]
    AgendaItemAdded {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// The new item.
        #[serde(rename = "agendaItemId")]
        agenda_item_id: AgendaItemId,
        /// Item title.
        title: String,
        /// Item description.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Position within the agenda.
        position: i64,
        /// Whether the item is put to a vote.
        #[serde(rename = "requiresVoting")]
        requires_voting: bool,
    },

    /// A vote landed; carries the freshly recomputed tally.
    #[serde(rename = "vote-tally-updated")]
    VoteTallyUpdated {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Agenda item the tally belongs to.
        #[serde(rename = "agendaItemId")]
        agenda_item_id: AgendaItemId,
        /// Recomputed counts.
        tally: Tally,
        /// Outcome derived from the tally.
        outcome: VoteOutcome,
    },
}

impl RoomEvent {
    /// Common fields shared by every variant.
    #[must_use]
    pub fn base(&self) -> &BaseEvent {
        match self {
            Self::ParticipantJoined { base, .. }
            | Self::ParticipantLeft { base, .. }
            | Self::ChatMessage { base, .. }
            | Self::AgendaItemAdded { base, .. }
            | Self::VoteTallyUpdated { base, .. } => base,
        }
    }

    /// Meeting the event belongs to.
    #[must_use]
    pub fn meeting_id(&self) -> &MeetingId {
        &self.base().meeting_id
    }

    /// When the event was published.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.base().timestamp
    }

    /// Wire value of the serde `type` tag.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::ParticipantJoined { .. } => "participant-joined",
            Self::ParticipantLeft { .. } => "participant-left",
            Self::ChatMessage { .. } => "chat-message",
            Self::AgendaItemAdded { .. } => "agenda-item-added",
            Self::VoteTallyUpdated { .. } => "vote-tally-updated",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Event constructors
// ─────────────────────────────────────────────────────────────────────────────

/// Create a participant-joined event.
#[must_use]
pub fn participant_joined_event(
    meeting_id: MeetingId,
    participant_id: ParticipantId,
    display_name: impl Into<String>,
    attendee_count: i64,
) -> RoomEvent {
    RoomEvent::ParticipantJoined {
        base: BaseEvent::now(meeting_id),
        participant_id,
        display_name: display_name.into(),
        attendee_count,
    }
}

/// Create a participant-left event.
#[must_use]
pub fn participant_left_event(
    meeting_id: MeetingId,
    participant_id: ParticipantId,
    display_name: impl Into<String>,
    attendee_count: i64,
) -> RoomEvent {
    RoomEvent::ParticipantLeft {
        base: BaseEvent::now(meeting_id),
        participant_id,
        display_name: display_name.into(),
        attendee_count,
    }
}

/// Create a vote-tally-updated event from a fresh tally.
#[must_use]
pub fn vote_tally_updated_event(
    meeting_id: MeetingId,
    agenda_item_id: AgendaItemId,
    tally: Tally,
) -> RoomEvent {
    RoomEvent::VoteTallyUpdated {
        base: BaseEvent::now(meeting_id),
        agenda_item_id,
        outcome: tally.outcome(),
        tally,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
