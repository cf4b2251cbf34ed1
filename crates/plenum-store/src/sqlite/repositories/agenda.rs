//! Agenda item repository: ordered items under a meeting.
//!
//! Positions are gap-tolerant: a new item takes `max(position) + 1` and
//! deletions leave holes. Display order is position order, never re-packed.

use rusqlite::{Connection, OptionalExtension, params};

use plenum_core::ids::AgendaItemId;
use plenum_core::model::AgendaItem;

use crate::errors::Result;

/// Options for creating a new agenda item.
pub struct CreateAgendaItemOptions<'a> {
    /// Owning meeting.
    pub meeting_id: &'a str,
    /// Item title.
    pub title: &'a str,
    /// Optional free-form description.
    pub description: Option<&'a str>,
    /// Whether the item is put to a vote.
    pub requires_voting: bool,
}

/// Agenda item repository. Stateless, every method takes `&Connection`.
pub struct AgendaRepo;

impl AgendaRepo {
    /// Create a new item at the end of the meeting's agenda.
    pub fn create(conn: &Connection, opts: &CreateAgendaItemOptions<'_>) -> Result<AgendaItem> {
        let id = AgendaItemId::generate();
        let now = chrono::Utc::now().to_rfc3339();

        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM agenda_items WHERE meeting_id = ?1",
            params![opts.meeting_id],
            |row| row.get(0),
        )?;

        let _ = conn.execute(
            "INSERT INTO agenda_items (id, meeting_id, title, description, position,
             requires_voting, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.as_str(),
                opts.meeting_id,
                opts.title,
                opts.description,
                position,
                opts.requires_voting,
                now,
            ],
        )?;

        Ok(AgendaItem {
            id,
            meeting_id: opts.meeting_id.to_string().into(),
            title: opts.title.to_string(),
            description: opts.description.map(String::from),
            position,
            requires_voting: opts.requires_voting,
            created_at: now,
        })
    }

    /// Get item by ID.
    pub fn get_by_id(conn: &Connection, agenda_item_id: &str) -> Result<Option<AgendaItem>> {
        let row = conn
            .query_row(
                "SELECT * FROM agenda_items WHERE id = ?1",
                params![agenda_item_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// All items of a meeting in position order.
    pub fn list_for_meeting(conn: &Connection, meeting_id: &str) -> Result<Vec<AgendaItem>> {
        let mut stmt = conn
            .prepare("SELECT * FROM agenda_items WHERE meeting_id = ?1 ORDER BY position ASC")?;
        let rows = stmt
            .query_map(params![meeting_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete an item. Votes cascade with it.
    pub fn delete(conn: &Connection, agenda_item_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM agenda_items WHERE id = ?1",
            params![agenda_item_id],
        )?;
        Ok(changed > 0)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgendaItem> {
        Ok(AgendaItem {
            id: row.get::<_, String>("id")?.into(),
            meeting_id: row.get::<_, String>("meeting_id")?.into(),
            title: row.get("title")?,
            description: row.get("description")?,
            position: row.get("position")?,
            requires_voting: row.get("requires_voting")?,
            created_at: row.get("created_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
