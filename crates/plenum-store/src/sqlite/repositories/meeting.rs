//! Meeting repository: lifecycle rows and status transitions.
//!
//! Status changes are compare-and-swap updates (`WHERE id = ? AND status = ?`)
//! so a stale caller affects zero rows instead of clobbering a concurrent
//! transition. Detail edits carry the planned-only gate in the SQL itself.

use rusqlite::{Connection, OptionalExtension, params};

use plenum_core::ids::MeetingId;
use plenum_core::model::Meeting;
use plenum_core::types::MeetingStatus;

use crate::errors::Result;

/// Options for creating a new meeting.
pub struct CreateMeetingOptions<'a> {
    /// Meeting title.
    pub title: &'a str,
    /// Optional free-form description.
    pub description: Option<&'a str>,
    /// Scheduled start, RFC 3339.
    pub scheduled_for: &'a str,
    /// Participant who created the meeting.
    pub creator_id: &'a str,
}

/// Detail fields editable while a meeting is still planned.
///
/// `None` leaves the column unchanged.
#[derive(Default)]
pub struct UpdateMeetingFields<'a> {
    /// New title.
    pub title: Option<&'a str>,
    /// New description.
    pub description: Option<&'a str>,
    /// New scheduled start, RFC 3339.
    pub scheduled_for: Option<&'a str>,
}

/// Meeting repository. Stateless, every method takes `&Connection`.
pub struct MeetingRepo;

impl MeetingRepo {
    /// Create a new meeting in `planned` status.
    pub fn create(conn: &Connection, opts: &CreateMeetingOptions<'_>) -> Result<Meeting> {
        let id = MeetingId::generate();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO meetings (id, title, description, scheduled_for, creator_id,
             status, reminder_sent, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'planned', 0, ?6, ?7)",
            params![
                id.as_str(),
                opts.title,
                opts.description,
                opts.scheduled_for,
                opts.creator_id,
                now,
                now,
            ],
        )?;

        Ok(Meeting {
            id,
            title: opts.title.to_string(),
            description: opts.description.map(String::from),
            scheduled_for: opts.scheduled_for.to_string(),
            creator_id: opts.creator_id.to_string().into(),
            status: MeetingStatus::Planned,
            protocol_url: None,
            reminder_sent: false,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get meeting by ID.
    pub fn get_by_id(conn: &Connection, meeting_id: &str) -> Result<Option<Meeting>> {
        let row = conn
            .query_row(
                "SELECT * FROM meetings WHERE id = ?1",
                params![meeting_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List meetings, optionally filtered by status, newest first by schedule.
    pub fn list(conn: &Connection, status: Option<MeetingStatus>) -> Result<Vec<Meeting>> {
        let (sql, filter) = match status {
            Some(status) => (
                "SELECT * FROM meetings WHERE status = ?1 ORDER BY scheduled_for DESC",
                Some(status.as_str()),
            ),
            None => ("SELECT * FROM meetings ORDER BY scheduled_for DESC", None),
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = match filter {
            Some(value) => stmt.query_map(params![value], Self::map_row)?,
            None => stmt.query_map([], Self::map_row)?,
        };
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Edit detail fields. Only planned meetings are editable; the status gate
    /// is part of the `WHERE` clause, so an ineligible meeting affects zero
    /// rows and this returns `false`.
    pub fn update_details(
        conn: &Connection,
        meeting_id: &str,
        fields: &UpdateMeetingFields<'_>,
    ) -> Result<bool> {
        let mut sets = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(title) = fields.title {
            param_values.push(Box::new(title.to_string()));
            sets.push(format!("title = ?{}", param_values.len()));
        }
        if let Some(description) = fields.description {
            param_values.push(Box::new(description.to_string()));
            sets.push(format!("description = ?{}", param_values.len()));
        }
        if let Some(scheduled_for) = fields.scheduled_for {
            param_values.push(Box::new(scheduled_for.to_string()));
            sets.push(format!("scheduled_for = ?{}", param_values.len()));
        }
        if sets.is_empty() {
            return Ok(false);
        }

        let now = chrono::Utc::now().to_rfc3339();
        param_values.push(Box::new(now));
        sets.push(format!("updated_at = ?{}", param_values.len()));
        param_values.push(Box::new(meeting_id.to_string()));

        let sql = format!(
            "UPDATE meetings SET {} WHERE id = ?{} AND status = 'planned'",
            sets.join(", "),
            param_values.len()
        );
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(Box::as_ref).collect();
        let changed = conn.execute(&sql, params_refs.as_slice())?;
        Ok(changed > 0)
    }

    /// Compare-and-swap status transition. Returns `false` when the meeting
    /// is missing or no longer in `from`.
    pub fn transition(
        conn: &Connection,
        meeting_id: &str,
        from: MeetingStatus,
        to: MeetingStatus,
    ) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let changed = conn.execute(
            "UPDATE meetings SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
            params![to.as_str(), now, meeting_id, from.as_str()],
        )?;
        Ok(changed > 0)
    }

    /// Cancel from either non-terminal status.
    pub fn cancel(conn: &Connection, meeting_id: &str) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let changed = conn.execute(
            "UPDATE meetings SET status = 'cancelled', updated_at = ?1
             WHERE id = ?2 AND status IN ('planned', 'active')",
            params![now, meeting_id],
        )?;
        Ok(changed > 0)
    }

    /// Record the rendered protocol URL.
    pub fn set_protocol_url(conn: &Connection, meeting_id: &str, url: &str) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let changed = conn.execute(
            "UPDATE meetings SET protocol_url = ?1, updated_at = ?2 WHERE id = ?3",
            params![url, now, meeting_id],
        )?;
        Ok(changed > 0)
    }

    /// Mark the reminder as sent.
    pub fn mark_reminder_sent(conn: &Connection, meeting_id: &str) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let changed = conn.execute(
            "UPDATE meetings SET reminder_sent = 1, updated_at = ?1 WHERE id = ?2",
            params![now, meeting_id],
        )?;
        Ok(changed > 0)
    }

    /// Planned meetings scheduled in `(after, until]` whose reminder has not
    /// been sent, soonest first. Bounds are RFC 3339 strings; lexicographic
    /// comparison equals chronological for normalized UTC timestamps.
    pub fn list_due_reminders(conn: &Connection, after: &str, until: &str) -> Result<Vec<Meeting>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meetings
             WHERE status = 'planned'
               AND reminder_sent = 0
               AND scheduled_for > ?1
               AND scheduled_for <= ?2
             ORDER BY scheduled_for ASC",
        )?;
        let rows = stmt
            .query_map(params![after, until], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Meeting> {
        let status: String = row.get("status")?;
        // status is column 5 in SELECT * order
        let status = status.parse::<MeetingStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Meeting {
            id: row.get::<_, String>("id")?.into(),
            title: row.get("title")?,
            description: row.get("description")?,
            scheduled_for: row.get("scheduled_for")?,
            creator_id: row.get::<_, String>("creator_id")?.into(),
            status,
            protocol_url: row.get("protocol_url")?,
            reminder_sent: row.get("reminder_sent")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::sqlite::migrations::run_migrations;

    fn migrated_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        let _ = run_migrations(&conn).unwrap();
        conn
    }

    fn create_default_meeting(conn: &Connection) -> Meeting {
        MeetingRepo::create(
            conn,
            &CreateMeetingOptions {
                title: "Quarterly Board Meeting",
                description: Some("Q2 review"),
                scheduled_for: "2025-06-01T10:00:00+00:00",
                creator_id: "p_founder",
            },
        )
        .unwrap()
    }

    #[test]
    fn create_meeting() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);

        assert!(meeting.id.starts_with("mtg_"));
        assert_eq!(meeting.title, "Quarterly Board Meeting");
        assert_eq!(meeting.description.as_deref(), Some("Q2 review"));
        assert_eq!(meeting.status, MeetingStatus::Planned);
        assert!(meeting.protocol_url.is_none());
        assert!(!meeting.reminder_sent);
        assert_eq!(meeting.created_at, meeting.updated_at);
    }

    #[test]
    fn get_by_id() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);

        let fetched = MeetingRepo::get_by_id(&conn, &meeting.id).unwrap().unwrap();
        assert_eq!(fetched.id, meeting.id);
        assert_eq!(fetched.title, meeting.title);
        assert_eq!(fetched.status, MeetingStatus::Planned);
    }

    #[test]
    fn get_by_id_missing_returns_none() {
        let conn = migrated_conn();
        assert!(MeetingRepo::get_by_id(&conn, "mtg_missing").unwrap().is_none());
    }

    #[test]
    fn list_orders_by_schedule_descending() {
        let conn = migrated_conn();
        let _early = MeetingRepo::create(
            &conn,
            &CreateMeetingOptions {
                title: "Early",
                description: None,
                scheduled_for: "2025-06-01T10:00:00+00:00",
                creator_id: "p_founder",
            },
        )
        .unwrap();
        let late = MeetingRepo::create(
            &conn,
            &CreateMeetingOptions {
                title: "Late",
                description: None,
                scheduled_for: "2025-07-01T10:00:00+00:00",
                creator_id: "p_founder",
            },
        )
        .unwrap();

        let all = MeetingRepo::list(&conn, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, late.id);
    }

    #[test]
    fn list_filters_by_status() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);
        let _other = MeetingRepo::create(
            &conn,
            &CreateMeetingOptions {
                title: "Other",
                description: None,
                scheduled_for: "2025-07-01T10:00:00+00:00",
                creator_id: "p_founder",
            },
        )
        .unwrap();
        assert!(MeetingRepo::transition(
            &conn,
            &meeting.id,
            MeetingStatus::Planned,
            MeetingStatus::Active
        )
        .unwrap());

        let active = MeetingRepo::list(&conn, Some(MeetingStatus::Active)).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, meeting.id);

        let planned = MeetingRepo::list(&conn, Some(MeetingStatus::Planned)).unwrap();
        assert_eq!(planned.len(), 1);
    }

    #[test]
    fn update_details_while_planned() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);

        let changed = MeetingRepo::update_details(
            &conn,
            &meeting.id,
            &UpdateMeetingFields {
                title: Some("Renamed"),
                scheduled_for: Some("2025-06-02T10:00:00+00:00"),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(changed);

        let fetched = MeetingRepo::get_by_id(&conn, &meeting.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Renamed");
        assert_eq!(fetched.scheduled_for, "2025-06-02T10:00:00+00:00");
        // untouched field survives
        assert_eq!(fetched.description.as_deref(), Some("Q2 review"));
    }

    #[test]
    fn update_details_rejected_once_active() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);
        assert!(MeetingRepo::transition(
            &conn,
            &meeting.id,
            MeetingStatus::Planned,
            MeetingStatus::Active
        )
        .unwrap());

        let changed = MeetingRepo::update_details(
            &conn,
            &meeting.id,
            &UpdateMeetingFields {
                title: Some("Too late"),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!changed);

        let fetched = MeetingRepo::get_by_id(&conn, &meeting.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Quarterly Board Meeting");
    }

    #[test]
    fn update_details_with_no_fields_is_noop() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);
        let changed =
            MeetingRepo::update_details(&conn, &meeting.id, &UpdateMeetingFields::default())
                .unwrap();
        assert!(!changed);
    }

    #[test]
    fn transition_cas_succeeds_from_expected_status() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);

        let ok = MeetingRepo::transition(
            &conn,
            &meeting.id,
            MeetingStatus::Planned,
            MeetingStatus::Active,
        )
        .unwrap();
        assert!(ok);

        let fetched = MeetingRepo::get_by_id(&conn, &meeting.id).unwrap().unwrap();
        assert_eq!(fetched.status, MeetingStatus::Active);
        assert!(fetched.updated_at >= fetched.created_at);
    }

    #[test]
    fn transition_cas_fails_from_stale_status() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);
        assert!(MeetingRepo::transition(
            &conn,
            &meeting.id,
            MeetingStatus::Planned,
            MeetingStatus::Active
        )
        .unwrap());

        // Meeting is active now; a second activate sees zero rows
        let stale = MeetingRepo::transition(
            &conn,
            &meeting.id,
            MeetingStatus::Planned,
            MeetingStatus::Active,
        )
        .unwrap();
        assert!(!stale);

        let fetched = MeetingRepo::get_by_id(&conn, &meeting.id).unwrap().unwrap();
        assert_eq!(fetched.status, MeetingStatus::Active);
    }

    #[test]
    fn cancel_from_planned_and_active() {
        let conn = migrated_conn();
        let planned = create_default_meeting(&conn);
        assert!(MeetingRepo::cancel(&conn, &planned.id).unwrap());
        assert_eq!(
            MeetingRepo::get_by_id(&conn, &planned.id).unwrap().unwrap().status,
            MeetingStatus::Cancelled
        );

        let active = create_default_meeting(&conn);
        assert!(MeetingRepo::transition(
            &conn,
            &active.id,
            MeetingStatus::Planned,
            MeetingStatus::Active
        )
        .unwrap());
        assert!(MeetingRepo::cancel(&conn, &active.id).unwrap());
        assert_eq!(
            MeetingRepo::get_by_id(&conn, &active.id).unwrap().unwrap().status,
            MeetingStatus::Cancelled
        );
    }

    #[test]
    fn cancel_rejected_on_terminal_status() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);
        assert!(MeetingRepo::cancel(&conn, &meeting.id).unwrap());

        // Already cancelled, so the second cancel affects zero rows
        assert!(!MeetingRepo::cancel(&conn, &meeting.id).unwrap());
    }

    #[test]
    fn set_protocol_url() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);

        assert!(
            MeetingRepo::set_protocol_url(&conn, &meeting.id, "https://docs.local/p/1.pdf")
                .unwrap()
        );
        let fetched = MeetingRepo::get_by_id(&conn, &meeting.id).unwrap().unwrap();
        assert_eq!(
            fetched.protocol_url.as_deref(),
            Some("https://docs.local/p/1.pdf")
        );
    }

    #[test]
    fn mark_reminder_sent() {
        let conn = migrated_conn();
        let meeting = create_default_meeting(&conn);

        assert!(MeetingRepo::mark_reminder_sent(&conn, &meeting.id).unwrap());
        let fetched = MeetingRepo::get_by_id(&conn, &meeting.id).unwrap().unwrap();
        assert!(fetched.reminder_sent);
    }

    #[test]
    fn list_due_reminders_respects_window_and_flag() {
        let conn = migrated_conn();
        let inside = MeetingRepo::create(
            &conn,
            &CreateMeetingOptions {
                title: "Inside window",
                description: None,
                scheduled_for: "2025-06-01T12:00:00+00:00",
                creator_id: "p_founder",
            },
        )
        .unwrap();
        let _past = MeetingRepo::create(
            &conn,
            &CreateMeetingOptions {
                title: "Already started",
                description: None,
                scheduled_for: "2025-05-31T12:00:00+00:00",
                creator_id: "p_founder",
            },
        )
        .unwrap();
        let _far = MeetingRepo::create(
            &conn,
            &CreateMeetingOptions {
                title: "Beyond window",
                description: None,
                scheduled_for: "2025-06-09T12:00:00+00:00",
                creator_id: "p_founder",
            },
        )
        .unwrap();
        let sent = MeetingRepo::create(
            &conn,
            &CreateMeetingOptions {
                title: "Reminder already sent",
                description: None,
                scheduled_for: "2025-06-01T13:00:00+00:00",
                creator_id: "p_founder",
            },
        )
        .unwrap();
        assert!(MeetingRepo::mark_reminder_sent(&conn, &sent.id).unwrap());

        let due = MeetingRepo::list_due_reminders(
            &conn,
            "2025-06-01T00:00:00+00:00",
            "2025-06-03T00:00:00+00:00",
        )
        .unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, inside.id);
    }

    #[test]
    fn list_due_reminders_excludes_non_planned() {
        let conn = migrated_conn();
        let meeting = MeetingRepo::create(
            &conn,
            &CreateMeetingOptions {
                title: "Cancelled",
                description: None,
                scheduled_for: "2025-06-01T12:00:00+00:00",
                creator_id: "p_founder",
            },
        )
        .unwrap();
        assert!(MeetingRepo::cancel(&conn, &meeting.id).unwrap());

        let due = MeetingRepo::list_due_reminders(
            &conn,
            "2025-06-01T00:00:00+00:00",
            "2025-06-03T00:00:00+00:00",
        )
        .unwrap();
        assert!(due.is_empty());
    }
}
