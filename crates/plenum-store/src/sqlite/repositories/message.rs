//! Chat message repository: append-only transcript per meeting.
//!
//! `seq` is the table's AUTOINCREMENT rowid, so two messages with identical
//! `created_at` still have a total order.

use rusqlite::{Connection, params};

use plenum_core::ids::MessageId;
use plenum_core::model::ChatMessage;

use crate::errors::Result;

/// Options for appending a chat message.
pub struct AppendMessageOptions<'a> {
    /// Meeting the message belongs to.
    pub meeting_id: &'a str,
    /// Sending participant.
    pub sender_id: &'a str,
    /// Message body.
    pub content: &'a str,
}

/// Message repository. Stateless, every method takes `&Connection`.
pub struct MessageRepo;

impl MessageRepo {
    /// Append a message to the meeting's transcript.
    pub fn append(conn: &Connection, opts: &AppendMessageOptions<'_>) -> Result<ChatMessage> {
        let id = MessageId::generate();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO messages (id, meeting_id, sender_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id.as_str(), opts.meeting_id, opts.sender_id, opts.content, now],
        )?;
        let seq = conn.last_insert_rowid();

        Ok(ChatMessage {
            id,
            meeting_id: opts.meeting_id.to_string().into(),
            sender_id: opts.sender_id.to_string().into(),
            content: opts.content.to_string(),
            created_at: now,
            seq,
        })
    }

    /// The full transcript of a meeting in send order.
    pub fn list_for_meeting(conn: &Connection, meeting_id: &str) -> Result<Vec<ChatMessage>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM messages WHERE meeting_id = ?1 ORDER BY created_at ASC, seq ASC",
        )?;
        let rows = stmt
            .query_map(params![meeting_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of messages in a meeting's transcript.
    pub fn count_for_meeting(conn: &Connection, meeting_id: &str) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE meeting_id = ?1",
            params![meeting_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
        Ok(ChatMessage {
            id: row.get::<_, String>("id")?.into(),
            meeting_id: row.get::<_, String>("meeting_id")?.into(),
            sender_id: row.get::<_, String>("sender_id")?.into(),
            content: row.get("content")?,
            created_at: row.get("created_at")?,
            seq: row.get("seq")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
