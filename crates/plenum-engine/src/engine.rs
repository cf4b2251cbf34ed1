//! The meeting engine: lifecycle state machine, attendance, voting, agenda,
//! and chat, with room event publication.
//!
//! Every action on one meeting runs under that meeting's lock, held across
//! validate, persist, publish; this is what makes room events arrive in
//! acceptance order. Acknowledgements go out only after SQLite commits.
//! Status changes are compare-and-swap writes in the store, so a stale
//! status surfaces as [`EngineError::StateConflict`] rather than a lost
//! update.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use plenum_core::events::{
    participant_joined_event, participant_left_event, vote_tally_updated_event, BaseEvent,
    RoomEvent,
};
use plenum_core::model::{AgendaItem, AttendanceRecord, ChatMessage, Meeting, Vote};
use plenum_core::types::{MeetingStatus, Tally, VoteValue};
use plenum_minutes::{DocumentRenderer, MinutesGenerator};
use plenum_store::{
    AppendMessageOptions, CastVoteOptions, CreateAgendaItemOptions, CreateMeetingOptions,
    MeetingStore, UpdateMeetingFields,
};

use crate::assembler::ProtocolAssembler;
use crate::errors::{EngineError, Result};
use crate::identity::{Directory, Profile};
use crate::locks::MeetingLocks;

/// Events published per process before a slow bridge consumer starts
/// lagging and losing history.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Engine policy knobs.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Minimum open attendance for a meeting to have quorum.
    pub quorum: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { quorum: 3 }
    }
}

/// Parameters for creating a meeting.
#[derive(Clone, Debug)]
pub struct CreateMeetingRequest {
    /// Meeting title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Scheduled start, RFC 3339.
    pub scheduled_for: String,
    /// Creating participant.
    pub creator_id: String,
}

/// Parameters for editing a planned meeting. Unset fields keep their value.
#[derive(Clone, Debug, Default)]
pub struct UpdateMeetingRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New scheduled start, RFC 3339.
    pub scheduled_for: Option<String>,
}

impl UpdateMeetingRequest {
    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.scheduled_for.is_none()
    }
}

/// Parameters for adding an agenda item.
#[derive(Clone, Debug)]
pub struct AddAgendaItemRequest {
    /// Owning meeting.
    pub meeting_id: String,
    /// Item title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the item is put to a vote. Immutable once set.
    pub requires_voting: bool,
}

/// Parameters for casting a ballot.
#[derive(Clone, Debug)]
pub struct CastVoteRequest {
    /// Agenda item voted on.
    pub agenda_item_id: String,
    /// Who casts the ballot.
    pub voter_id: String,
    /// The ballot value.
    pub value: VoteValue,
    /// Optional comment.
    pub comment: Option<String>,
}

/// Parameters for sending a chat message.
#[derive(Clone, Debug)]
pub struct SendMessageRequest {
    /// Owning meeting.
    pub meeting_id: String,
    /// Sender.
    pub sender_id: String,
    /// Message body.
    pub content: String,
}

/// Acknowledgement for a join.
#[derive(Clone, Debug)]
pub struct JoinAck {
    /// The open attendance record.
    pub record: AttendanceRecord,
    /// `false` when the participant already had an open record.
    pub newly_joined: bool,
    /// Open attendance count after the join.
    pub attendee_count: i64,
}

/// Acknowledgement for a cast vote: the persisted row and the fresh tally.
#[derive(Clone, Debug)]
pub struct VoteAck {
    /// The persisted (possibly replaced) vote row.
    pub vote: Vote,
    /// Tally recomputed after the cast.
    pub tally: Tally,
}

/// The single authoritative coordinator for all meetings in this process.
pub struct MeetingEngine {
    store: Arc<MeetingStore>,
    directory: Arc<dyn Directory>,
    assembler: ProtocolAssembler,
    locks: MeetingLocks,
    events_tx: broadcast::Sender<RoomEvent>,
    config: EngineConfig,
}

impl MeetingEngine {
    /// Wire up the engine with its collaborators.
    pub fn new(
        store: Arc<MeetingStore>,
        directory: Arc<dyn Directory>,
        generator: Arc<dyn MinutesGenerator>,
        renderer: Arc<dyn DocumentRenderer>,
        config: EngineConfig,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let assembler = ProtocolAssembler::new(
            Arc::clone(&store),
            Arc::clone(&directory),
            generator,
            renderer,
        );
        Self {
            store,
            directory,
            assembler,
            locks: MeetingLocks::new(),
            events_tx,
            config,
        }
    }

    /// Subscribe to the room event stream. Events published before the
    /// subscription are never replayed.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<RoomEvent> {
        self.events_tx.subscribe()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Create a meeting. Status starts `planned`, reminder unsent.
    pub fn create_meeting(&self, request: &CreateMeetingRequest) -> Result<Meeting> {
        let meeting = self.store.create_meeting(&CreateMeetingOptions {
            title: &request.title,
            description: request.description.as_deref(),
            scheduled_for: &request.scheduled_for,
            creator_id: &request.creator_id,
        })?;
        info!(meeting_id = %meeting.id, title = %meeting.title, "Meeting created");
        Ok(meeting)
    }

    /// Fetch one meeting.
    pub fn get_meeting(&self, meeting_id: &str) -> Result<Meeting> {
        self.require_meeting(meeting_id)
    }

    /// List meetings, optionally filtered by status, newest first.
    pub fn list_meetings(&self, status: Option<MeetingStatus>) -> Result<Vec<Meeting>> {
        Ok(self.store.list_meetings(status)?)
    }

    /// Edit title, description, or scheduled start. Only `planned` meetings
    /// are editable; an empty request returns the meeting unchanged.
    pub async fn update_meeting(
        &self,
        meeting_id: &str,
        request: &UpdateMeetingRequest,
    ) -> Result<Meeting> {
        let _guard = self.locks.hold(meeting_id).await;

        let meeting = self.require_meeting(meeting_id)?;
        if request.is_empty() {
            return Ok(meeting);
        }
        if meeting.status != MeetingStatus::Planned {
            return Err(EngineError::StateConflict(format!(
                "meeting {meeting_id} is {}; details are editable only while planned",
                meeting.status
            )));
        }
        let changed = self.store.update_meeting(
            meeting_id,
            &UpdateMeetingFields {
                title: request.title.as_deref(),
                description: request.description.as_deref(),
                scheduled_for: request.scheduled_for.as_deref(),
            },
        )?;
        if !changed {
            return Err(EngineError::StateConflict(format!(
                "meeting {meeting_id} is no longer editable"
            )));
        }
        info!(meeting_id, "Meeting details updated");
        self.require_meeting(meeting_id)
    }

    /// Transition `planned → active`. Attendance accrues from this point.
    pub async fn activate_meeting(&self, meeting_id: &str) -> Result<Meeting> {
        let _guard = self.locks.hold(meeting_id).await;

        let meeting = self.require_meeting(meeting_id)?;
        match self.store.activate_meeting(meeting_id)? {
            Some(activated) => {
                info!(meeting_id, "Meeting activated");
                Ok(activated)
            }
            None => Err(EngineError::StateConflict(format!(
                "cannot activate meeting {meeting_id} from {}",
                meeting.status
            ))),
        }
    }

    /// Transition `active → completed`, closing every open attendance record
    /// with the completion timestamp, then run the minutes pipeline once.
    ///
    /// A collaborator failure is reported as [`EngineError::Collaborator`]
    /// but the completed status stands; `generate_minutes` is the retry
    /// path.
    pub async fn complete_meeting(&self, meeting_id: &str) -> Result<Meeting> {
        {
            let _guard = self.locks.hold(meeting_id).await;

            let meeting = self.require_meeting(meeting_id)?;
            let Some(result) = self.store.complete_meeting(meeting_id)? else {
                return Err(EngineError::StateConflict(format!(
                    "cannot complete meeting {meeting_id} from {}",
                    meeting.status
                )));
            };
            info!(
                meeting_id,
                attendance_closed = result.attendance_closed,
                "Meeting completed"
            );
        }
        // The minutes pipeline runs outside the lock; it can take seconds
        // and must not block the room.
        let _ = self.assembler.assemble(meeting_id).await?;
        self.require_meeting(meeting_id)
    }

    /// Transition `planned → cancelled` or `active → cancelled`.
    pub async fn cancel_meeting(&self, meeting_id: &str) -> Result<Meeting> {
        let _guard = self.locks.hold(meeting_id).await;

        let meeting = self.require_meeting(meeting_id)?;
        match self.store.cancel_meeting(meeting_id)? {
            Some(cancelled) => {
                info!(meeting_id, from = %meeting.status, "Meeting cancelled");
                Ok(cancelled)
            }
            None => Err(EngineError::StateConflict(format!(
                "cannot cancel meeting {meeting_id} from {}",
                meeting.status
            ))),
        }
    }

    /// Re-run the minutes pipeline for a completed meeting (operator retry
    /// after a collaborator failure).
    pub async fn generate_minutes(&self, meeting_id: &str) -> Result<Meeting> {
        let meeting = self.require_meeting(meeting_id)?;
        if meeting.status != MeetingStatus::Completed {
            return Err(EngineError::StateConflict(format!(
                "minutes can be generated only for completed meetings; meeting {meeting_id} is {}",
                meeting.status
            )));
        }
        let _ = self.assembler.assemble(meeting_id).await?;
        self.require_meeting(meeting_id)
    }

    // ── Attendance ────────────────────────────────────────────────────────

    /// Join an active meeting. Idempotent: a second join without a leave
    /// returns the existing record and publishes nothing.
    pub async fn join_meeting(&self, meeting_id: &str, participant_id: &str) -> Result<JoinAck> {
        let profile = self.require_profile(participant_id).await?;
        let _guard = self.locks.hold(meeting_id).await;

        let meeting = self.require_meeting(meeting_id)?;
        if meeting.status != MeetingStatus::Active {
            return Err(EngineError::StateConflict(format!(
                "cannot join meeting {meeting_id} while {}",
                meeting.status
            )));
        }
        let outcome = self.store.join_meeting(meeting_id, participant_id)?;
        let attendee_count = self.store.attendee_count(meeting_id)?;
        if outcome.newly_joined {
            info!(meeting_id, participant_id, attendee_count, "Participant joined");
            self.publish(participant_joined_event(
                meeting.id,
                outcome.record.participant_id.clone(),
                profile.display_name,
                attendee_count,
            ));
        }
        Ok(JoinAck {
            record: outcome.record,
            newly_joined: outcome.newly_joined,
            attendee_count,
        })
    }

    /// Leave a meeting: closes the open record if one exists, otherwise a
    /// no-op. Returns the open attendance count afterwards.
    pub async fn leave_meeting(&self, meeting_id: &str, participant_id: &str) -> Result<i64> {
        let profile = self.require_profile(participant_id).await?;
        let _guard = self.locks.hold(meeting_id).await;

        let meeting = self.require_meeting(meeting_id)?;
        let closed = self.store.leave_meeting(meeting_id, participant_id)?;
        let attendee_count = self.store.attendee_count(meeting_id)?;
        if closed {
            info!(meeting_id, participant_id, attendee_count, "Participant left");
            self.publish(participant_left_event(
                meeting.id,
                participant_id.into(),
                profile.display_name,
                attendee_count,
            ));
        }
        Ok(attendee_count)
    }

    /// Open attendance count, always counted live.
    pub fn attendee_count(&self, meeting_id: &str) -> Result<i64> {
        let _ = self.require_meeting(meeting_id)?;
        Ok(self.store.attendee_count(meeting_id)?)
    }

    /// Whether open attendance meets the configured quorum.
    pub fn has_quorum(&self, meeting_id: &str) -> Result<bool> {
        Ok(self.attendee_count(meeting_id)? >= i64::from(self.config.quorum))
    }

    // ── Agenda ────────────────────────────────────────────────────────────

    /// Add an agenda item. Allowed while `planned`, and during `active` for
    /// ad-hoc items. The item takes the next position.
    pub async fn add_agenda_item(&self, request: &AddAgendaItemRequest) -> Result<AgendaItem> {
        let _guard = self.locks.hold(&request.meeting_id).await;

        let meeting = self.require_meeting(&request.meeting_id)?;
        if !matches!(
            meeting.status,
            MeetingStatus::Planned | MeetingStatus::Active
        ) {
            return Err(EngineError::StateConflict(format!(
                "cannot add agenda items to meeting {} while {}",
                request.meeting_id, meeting.status
            )));
        }
        let item = self.store.add_agenda_item(&CreateAgendaItemOptions {
            meeting_id: &request.meeting_id,
            title: &request.title,
            description: request.description.as_deref(),
            requires_voting: request.requires_voting,
        })?;
        info!(
            meeting_id = %request.meeting_id,
            agenda_item_id = %item.id,
            position = item.position,
            "Agenda item added"
        );
        self.publish(RoomEvent::AgendaItemAdded {
            base: BaseEvent::now(meeting.id),
            agenda_item_id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            position: item.position,
            requires_voting: item.requires_voting,
        });
        Ok(item)
    }

    /// List a meeting's agenda in position order.
    pub fn list_agenda(&self, meeting_id: &str) -> Result<Vec<AgendaItem>> {
        let _ = self.require_meeting(meeting_id)?;
        Ok(self.store.list_agenda(meeting_id)?)
    }

    /// Remove an agenda item. Allowed only while the meeting is `planned`.
    pub async fn remove_agenda_item(&self, agenda_item_id: &str) -> Result<()> {
        let item = self.require_agenda_item(agenda_item_id)?;
        let meeting_id = item.meeting_id.as_str().to_string();
        let _guard = self.locks.hold(&meeting_id).await;

        let meeting = self.require_meeting(&meeting_id)?;
        if meeting.status != MeetingStatus::Planned {
            return Err(EngineError::StateConflict(format!(
                "agenda items can be removed only while planned; meeting {meeting_id} is {}",
                meeting.status
            )));
        }
        if !self.store.remove_agenda_item(agenda_item_id)? {
            return Err(EngineError::AgendaItemNotFound(agenda_item_id.to_string()));
        }
        info!(%meeting_id, agenda_item_id, "Agenda item removed");
        Ok(())
    }

    // ── Voting ────────────────────────────────────────────────────────────

    /// Cast (or replace) a ballot. The owning meeting must be `active` and
    /// the item voting-enabled; the upsert is atomic and the fresh tally is
    /// published to the room before the acknowledgement returns.
    pub async fn cast_vote(&self, request: &CastVoteRequest) -> Result<VoteAck> {
        let item = self.require_agenda_item(&request.agenda_item_id)?;
        let meeting_id = item.meeting_id.as_str().to_string();
        let _guard = self.locks.hold(&meeting_id).await;

        let meeting = self.require_meeting(&meeting_id)?;
        if meeting.status != MeetingStatus::Active {
            return Err(EngineError::VotingNotAllowed(format!(
                "meeting {meeting_id} is {}; votes are accepted only while active",
                meeting.status
            )));
        }
        if !item.requires_voting {
            return Err(EngineError::VotingNotAllowed(format!(
                "agenda item {} is not voting-enabled",
                request.agenda_item_id
            )));
        }
        let (vote, tally) = self.store.cast_vote(&CastVoteOptions {
            agenda_item_id: &request.agenda_item_id,
            voter_id: &request.voter_id,
            value: request.value,
            comment: request.comment.as_deref(),
        })?;
        info!(
            %meeting_id,
            agenda_item_id = %request.agenda_item_id,
            voter_id = %request.voter_id,
            value = %request.value,
            "Vote cast"
        );
        self.publish(vote_tally_updated_event(meeting.id, item.id, tally));
        Ok(VoteAck { vote, tally })
    }

    /// Current tally for an agenda item, recomputed from the vote rows.
    pub fn vote_tally(&self, agenda_item_id: &str) -> Result<Tally> {
        let _ = self.require_agenda_item(agenda_item_id)?;
        Ok(self.store.vote_tally(agenda_item_id)?)
    }

    // ── Chat ──────────────────────────────────────────────────────────────

    /// Persist a chat message and echo it to the room, sender included.
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<ChatMessage> {
        let profile = self.require_profile(&request.sender_id).await?;
        let _guard = self.locks.hold(&request.meeting_id).await;

        let meeting = self.require_meeting(&request.meeting_id)?;
        if meeting.status != MeetingStatus::Active {
            return Err(EngineError::StateConflict(format!(
                "chat is open only while meeting {} is active",
                request.meeting_id
            )));
        }
        let message = self.store.append_message(&AppendMessageOptions {
            meeting_id: &request.meeting_id,
            sender_id: &request.sender_id,
            content: &request.content,
        })?;
        self.publish(RoomEvent::ChatMessage {
            base: BaseEvent::now(meeting.id),
            message_id: message.id.clone(),
            sender_id: message.sender_id.clone(),
            sender_name: profile.display_name,
            content: message.content.clone(),
        });
        Ok(message)
    }

    /// Full chat transcript in send order.
    pub fn chat_history(&self, meeting_id: &str) -> Result<Vec<ChatMessage>> {
        let _ = self.require_meeting(meeting_id)?;
        Ok(self.store.chat_history(meeting_id)?)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn require_meeting(&self, meeting_id: &str) -> Result<Meeting> {
        self.store
            .get_meeting(meeting_id)?
            .ok_or_else(|| EngineError::MeetingNotFound(meeting_id.to_string()))
    }

    fn require_agenda_item(&self, agenda_item_id: &str) -> Result<AgendaItem> {
        self.store
            .get_agenda_item(agenda_item_id)?
            .ok_or_else(|| EngineError::AgendaItemNotFound(agenda_item_id.to_string()))
    }

    async fn require_profile(&self, participant_id: &str) -> Result<Profile> {
        self.directory
            .lookup(participant_id)
            .await
            .ok_or_else(|| EngineError::ParticipantNotFound(participant_id.to_string()))
    }

    /// Publish a room event. Called while holding the meeting's lock so the
    /// channel carries events in acceptance order.
    fn publish(&self, event: RoomEvent) {
        metrics::counter!("room_events_published_total", "type" => event.event_type().to_string())
            .increment(1);
        // Send fails only when no receiver is subscribed.
        let _ = self.events_tx.send(event);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
