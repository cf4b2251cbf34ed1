//! Transactional facade over the repository layer.
//!
//! One [`MeetingStore`] owns the connection pool and is shared behind an
//! `Arc` by the engine. Methods that touch several rows (completion,
//! cancellation, vote upsert plus tally) run inside a single transaction.

use rusqlite::Connection;
use tracing::debug;

use plenum_core::model::{AgendaItem, AttendanceRecord, ChatMessage, Meeting, Vote};
use plenum_core::types::{MeetingStatus, Tally};

use crate::errors::{Result, StoreError};
use crate::sqlite::connection::{ConnectionPool, PooledConnection};
use crate::sqlite::repositories::agenda::{AgendaRepo, CreateAgendaItemOptions};
use crate::sqlite::repositories::attendance::AttendanceRepo;
use crate::sqlite::repositories::meeting::{
    CreateMeetingOptions, MeetingRepo, UpdateMeetingFields,
};
use crate::sqlite::repositories::message::{AppendMessageOptions, MessageRepo};
use crate::sqlite::repositories::vote::{CastVoteOptions, VoteRepo};

/// Result of a join: the open record plus whether it was created just now.
#[derive(Clone, Debug)]
pub struct JoinOutcome {
    /// The open attendance record.
    pub record: AttendanceRecord,
    /// `false` when the participant already had an open record (idempotent
    /// re-join).
    pub newly_joined: bool,
}

/// Result of completing a meeting.
#[derive(Clone, Debug)]
pub struct CompletionResult {
    /// The meeting, now `completed`.
    pub meeting: Meeting,
    /// How many open attendance records were closed by the completion stamp.
    pub attendance_closed: usize,
}

/// One agenda item together with its current tally.
#[derive(Clone, Debug)]
pub struct AgendaEntry {
    /// The agenda item.
    pub item: AgendaItem,
    /// Vote counts for the item.
    pub tally: Tally,
}

/// Everything the minutes pipeline needs about one meeting, read in one pass.
#[derive(Clone, Debug)]
pub struct MeetingSnapshot {
    /// The meeting row.
    pub meeting: Meeting,
    /// Agenda items in position order, each with its tally.
    pub agenda: Vec<AgendaEntry>,
    /// Full attendance history, oldest join first.
    pub attendance: Vec<AttendanceRecord>,
    /// Full chat transcript in send order.
    pub messages: Vec<ChatMessage>,
}

/// High-level store facade. Cheap to clone is not a goal, share via `Arc`.
pub struct MeetingStore {
    pool: ConnectionPool,
}

impl MeetingStore {
    /// Create a store over an existing connection pool. Run migrations first.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    fn checkout(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    // ── Meetings ──────────────────────────────────────────────────────────

    /// Create a meeting in `planned` status.
    pub fn create_meeting(&self, opts: &CreateMeetingOptions<'_>) -> Result<Meeting> {
        let conn = self.checkout()?;
        let meeting = MeetingRepo::create(&conn, opts)?;
        debug!(meeting_id = %meeting.id, "meeting created");
        Ok(meeting)
    }

    /// Fetch a meeting by id.
    pub fn get_meeting(&self, meeting_id: &str) -> Result<Option<Meeting>> {
        let conn = self.checkout()?;
        MeetingRepo::get_by_id(&conn, meeting_id)
    }

    /// List meetings, optionally filtered by status, newest first by schedule.
    pub fn list_meetings(&self, status: Option<MeetingStatus>) -> Result<Vec<Meeting>> {
        let conn = self.checkout()?;
        MeetingRepo::list(&conn, status)
    }

    /// Edit detail fields of a planned meeting. Returns `false` when the
    /// meeting is missing, no longer planned, or no fields were given.
    pub fn update_meeting(&self, meeting_id: &str, fields: &UpdateMeetingFields<'_>) -> Result<bool> {
        let conn = self.checkout()?;
        MeetingRepo::update_details(&conn, meeting_id, fields)
    }

    /// CAS `planned → active`. `None` when the meeting is missing or not
    /// planned; the caller turns that into a state conflict.
    pub fn activate_meeting(&self, meeting_id: &str) -> Result<Option<Meeting>> {
        let conn = self.checkout()?;
        if !MeetingRepo::transition(&conn, meeting_id, MeetingStatus::Planned, MeetingStatus::Active)? {
            return Ok(None);
        }
        let meeting = Self::require_meeting(&conn, meeting_id)?;
        debug!(meeting_id, "meeting activated");
        Ok(Some(meeting))
    }

    /// CAS `active → completed` and stamp every open attendance record with
    /// the single completion timestamp, all in one transaction. `None` when
    /// the meeting is missing or not active.
    pub fn complete_meeting(&self, meeting_id: &str) -> Result<Option<CompletionResult>> {
        let conn = self.checkout()?;
        let completed_at = chrono::Utc::now().to_rfc3339();

        let tx = conn.unchecked_transaction()?;
        if !MeetingRepo::transition(&tx, meeting_id, MeetingStatus::Active, MeetingStatus::Completed)? {
            return Ok(None);
        }
        let attendance_closed = AttendanceRepo::close_all_open(&tx, meeting_id, &completed_at)?;
        tx.commit()?;

        let meeting = Self::require_meeting(&conn, meeting_id)?;
        debug!(meeting_id, attendance_closed, "meeting completed");
        Ok(Some(CompletionResult {
            meeting,
            attendance_closed,
        }))
    }

    /// Cancel from `planned` or `active`, closing any open attendance in the
    /// same transaction. `None` when the meeting is missing or terminal.
    pub fn cancel_meeting(&self, meeting_id: &str) -> Result<Option<Meeting>> {
        let conn = self.checkout()?;
        let cancelled_at = chrono::Utc::now().to_rfc3339();

        let tx = conn.unchecked_transaction()?;
        if !MeetingRepo::cancel(&tx, meeting_id)? {
            return Ok(None);
        }
        let closed = AttendanceRepo::close_all_open(&tx, meeting_id, &cancelled_at)?;
        tx.commit()?;

        let meeting = Self::require_meeting(&conn, meeting_id)?;
        debug!(meeting_id, closed, "meeting cancelled");
        Ok(Some(meeting))
    }

    /// Record the rendered protocol URL on a meeting.
    pub fn set_protocol_url(&self, meeting_id: &str, url: &str) -> Result<bool> {
        let conn = self.checkout()?;
        MeetingRepo::set_protocol_url(&conn, meeting_id, url)
    }

    // ── Agenda ────────────────────────────────────────────────────────────

    /// Append an agenda item at the next free position.
    pub fn add_agenda_item(&self, opts: &CreateAgendaItemOptions<'_>) -> Result<AgendaItem> {
        let conn = self.checkout()?;
        AgendaRepo::create(&conn, opts)
    }

    /// Fetch an agenda item by id.
    pub fn get_agenda_item(&self, agenda_item_id: &str) -> Result<Option<AgendaItem>> {
        let conn = self.checkout()?;
        AgendaRepo::get_by_id(&conn, agenda_item_id)
    }

    /// All items of a meeting in position order.
    pub fn list_agenda(&self, meeting_id: &str) -> Result<Vec<AgendaItem>> {
        let conn = self.checkout()?;
        AgendaRepo::list_for_meeting(&conn, meeting_id)
    }

    /// Delete an agenda item (votes cascade).
    pub fn remove_agenda_item(&self, agenda_item_id: &str) -> Result<bool> {
        let conn = self.checkout()?;
        AgendaRepo::delete(&conn, agenda_item_id)
    }

    // ── Attendance ────────────────────────────────────────────────────────

    /// Idempotent join: returns the existing open record when there is one,
    /// otherwise inserts a new record.
    pub fn join_meeting(&self, meeting_id: &str, participant_id: &str) -> Result<JoinOutcome> {
        let conn = self.checkout()?;
        if let Some(record) = AttendanceRepo::find_open(&conn, meeting_id, participant_id)? {
            return Ok(JoinOutcome {
                record,
                newly_joined: false,
            });
        }
        let record = AttendanceRepo::open(&conn, meeting_id, participant_id)?;
        Ok(JoinOutcome {
            record,
            newly_joined: true,
        })
    }

    /// Close the participant's open record. `false` when none was open.
    pub fn leave_meeting(&self, meeting_id: &str, participant_id: &str) -> Result<bool> {
        let conn = self.checkout()?;
        let left_at = chrono::Utc::now().to_rfc3339();
        AttendanceRepo::close(&conn, meeting_id, participant_id, &left_at)
    }

    /// Count of currently-open attendance records.
    pub fn attendee_count(&self, meeting_id: &str) -> Result<i64> {
        let conn = self.checkout()?;
        AttendanceRepo::count_open(&conn, meeting_id)
    }

    /// Full attendance history of a meeting.
    pub fn attendance_history(&self, meeting_id: &str) -> Result<Vec<AttendanceRecord>> {
        let conn = self.checkout()?;
        AttendanceRepo::list_for_meeting(&conn, meeting_id)
    }

    // ── Votes ─────────────────────────────────────────────────────────────

    /// Upsert a vote and recompute the item's tally in one transaction.
    pub fn cast_vote(&self, opts: &CastVoteOptions<'_>) -> Result<(Vote, Tally)> {
        let conn = self.checkout()?;
        let tx = conn.unchecked_transaction()?;
        let vote = VoteRepo::upsert(&tx, opts)?;
        let tally = VoteRepo::tally(&tx, opts.agenda_item_id)?;
        tx.commit()?;
        Ok((vote, tally))
    }

    /// Current tally for an agenda item.
    pub fn vote_tally(&self, agenda_item_id: &str) -> Result<Tally> {
        let conn = self.checkout()?;
        VoteRepo::tally(&conn, agenda_item_id)
    }

    // ── Chat ──────────────────────────────────────────────────────────────

    /// Append a message to the transcript.
    pub fn append_message(&self, opts: &AppendMessageOptions<'_>) -> Result<ChatMessage> {
        let conn = self.checkout()?;
        MessageRepo::append(&conn, opts)
    }

    /// The full transcript of a meeting.
    pub fn chat_history(&self, meeting_id: &str) -> Result<Vec<ChatMessage>> {
        let conn = self.checkout()?;
        MessageRepo::list_for_meeting(&conn, meeting_id)
    }

    // ── Reminders ─────────────────────────────────────────────────────────

    /// Planned, unreminded meetings scheduled within the next `window_hours`.
    pub fn due_reminders(&self, window_hours: i64) -> Result<Vec<Meeting>> {
        let conn = self.checkout()?;
        let now = chrono::Utc::now();
        let until = now + chrono::Duration::hours(window_hours);
        MeetingRepo::list_due_reminders(&conn, &now.to_rfc3339(), &until.to_rfc3339())
    }

    /// Mark a meeting's reminder as sent.
    pub fn mark_reminder_sent(&self, meeting_id: &str) -> Result<bool> {
        let conn = self.checkout()?;
        MeetingRepo::mark_reminder_sent(&conn, meeting_id)
    }

    // ── Snapshot ──────────────────────────────────────────────────────────

    /// Read everything the minutes pipeline needs about one meeting.
    ///
    /// # Errors
    ///
    /// [`StoreError::MeetingNotFound`] when the meeting does not exist.
    pub fn snapshot(&self, meeting_id: &str) -> Result<MeetingSnapshot> {
        let conn = self.checkout()?;
        let meeting = Self::require_meeting(&conn, meeting_id)?;

        let items = AgendaRepo::list_for_meeting(&conn, meeting_id)?;
        let mut agenda = Vec::with_capacity(items.len());
        for item in items {
            let tally = VoteRepo::tally(&conn, &item.id)?;
            agenda.push(AgendaEntry { item, tally });
        }

        let attendance = AttendanceRepo::list_for_meeting(&conn, meeting_id)?;
        let messages = MessageRepo::list_for_meeting(&conn, meeting_id)?;

        Ok(MeetingSnapshot {
            meeting,
            agenda,
            attendance,
            messages,
        })
    }

    fn require_meeting(conn: &Connection, meeting_id: &str) -> Result<Meeting> {
        MeetingRepo::get_by_id(conn, meeting_id)?
            .ok_or_else(|| StoreError::MeetingNotFound(meeting_id.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
