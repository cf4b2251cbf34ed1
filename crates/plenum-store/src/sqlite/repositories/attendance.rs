//! Attendance repository: presence records with open/closed semantics.
//!
//! A record with `left_at IS NULL` is an open presence. The partial unique
//! index on (meeting_id, participant_id) guarantees at most one open record
//! per pair; closed records accumulate as history.

use rusqlite::{Connection, OptionalExtension, params};

use plenum_core::ids::AttendanceId;
use plenum_core::model::AttendanceRecord;

use crate::errors::Result;

/// Attendance repository. Stateless, every method takes `&Connection`.
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Insert a new open record with `joined_at = now`.
    pub fn open(
        conn: &Connection,
        meeting_id: &str,
        participant_id: &str,
    ) -> Result<AttendanceRecord> {
        let id = AttendanceId::generate();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO attendance (id, meeting_id, participant_id, joined_at, left_at)
             VALUES (?1, ?2, ?3, ?4, NULL)",
            params![id.as_str(), meeting_id, participant_id, now],
        )?;

        Ok(AttendanceRecord {
            id,
            meeting_id: meeting_id.to_string().into(),
            participant_id: participant_id.to_string().into(),
            joined_at: now,
            left_at: None,
        })
    }

    /// Find the open record for a (meeting, participant) pair, if any.
    pub fn find_open(
        conn: &Connection,
        meeting_id: &str,
        participant_id: &str,
    ) -> Result<Option<AttendanceRecord>> {
        let row = conn
            .query_row(
                "SELECT * FROM attendance
                 WHERE meeting_id = ?1 AND participant_id = ?2 AND left_at IS NULL",
                params![meeting_id, participant_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Close the open record for a pair. Returns `false` when none is open.
    pub fn close(
        conn: &Connection,
        meeting_id: &str,
        participant_id: &str,
        left_at: &str,
    ) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE attendance SET left_at = ?1
             WHERE meeting_id = ?2 AND participant_id = ?3 AND left_at IS NULL",
            params![left_at, meeting_id, participant_id],
        )?;
        Ok(changed > 0)
    }

    /// Close every open record of a meeting with one shared timestamp.
    /// Returns the number of records closed.
    pub fn close_all_open(conn: &Connection, meeting_id: &str, left_at: &str) -> Result<usize> {
        let changed = conn.execute(
            "UPDATE attendance SET left_at = ?1 WHERE meeting_id = ?2 AND left_at IS NULL",
            params![left_at, meeting_id],
        )?;
        Ok(changed)
    }

    /// Count of currently-open records for a meeting.
    pub fn count_open(conn: &Connection, meeting_id: &str) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM attendance WHERE meeting_id = ?1 AND left_at IS NULL",
            params![meeting_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Full attendance history for a meeting, oldest join first.
    pub fn list_for_meeting(conn: &Connection, meeting_id: &str) -> Result<Vec<AttendanceRecord>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM attendance WHERE meeting_id = ?1 ORDER BY joined_at ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![meeting_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AttendanceRecord> {
        Ok(AttendanceRecord {
            id: row.get::<_, String>("id")?.into(),
            meeting_id: row.get::<_, String>("meeting_id")?.into(),
            participant_id: row.get::<_, String>("participant_id")?.into(),
            joined_at: row.get("joined_at")?,
            left_at: row.get("left_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
