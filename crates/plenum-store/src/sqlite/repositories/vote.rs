//! Vote repository: one row per (agenda item, voter), last writer wins.
//!
//! The upsert is a single `INSERT … ON CONFLICT … DO UPDATE` statement, so a
//! repeated cast can never race itself into a duplicate row. The stored row
//! keeps its original id across re-casts; only value, comment, and timestamp
//! move.

use rusqlite::{Connection, OptionalExtension, params};

use plenum_core::ids::VoteId;
use plenum_core::model::Vote;
use plenum_core::types::{Tally, VoteValue};

use crate::errors::{Result, StoreError};

/// Options for casting (or re-casting) a vote.
pub struct CastVoteOptions<'a> {
    /// Agenda item being voted on.
    pub agenda_item_id: &'a str,
    /// Voting participant.
    pub voter_id: &'a str,
    /// The vote value.
    pub value: VoteValue,
    /// Optional free-form comment.
    pub comment: Option<&'a str>,
}

/// Vote repository. Stateless, every method takes `&Connection`.
pub struct VoteRepo;

impl VoteRepo {
    /// Upsert the (item, voter) row and return the stored vote.
    pub fn upsert(conn: &Connection, opts: &CastVoteOptions<'_>) -> Result<Vote> {
        let id = VoteId::generate();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO votes (id, agenda_item_id, voter_id, value, comment, cast_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (agenda_item_id, voter_id)
             DO UPDATE SET value = excluded.value,
                           comment = excluded.comment,
                           cast_at = excluded.cast_at",
            params![
                id.as_str(),
                opts.agenda_item_id,
                opts.voter_id,
                opts.value.as_str(),
                opts.comment,
                now,
            ],
        )?;

        // On conflict the row keeps its original id, so read it back.
        Self::get_for_voter(conn, opts.agenda_item_id, opts.voter_id)?
            .ok_or_else(|| StoreError::Internal("vote upsert left no row behind".to_string()))
    }

    /// The voter's current vote on an item, if any.
    pub fn get_for_voter(
        conn: &Connection,
        agenda_item_id: &str,
        voter_id: &str,
    ) -> Result<Option<Vote>> {
        let row = conn
            .query_row(
                "SELECT * FROM votes WHERE agenda_item_id = ?1 AND voter_id = ?2",
                params![agenda_item_id, voter_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Recompute the tally for an item by scanning its vote rows.
    pub fn tally(conn: &Connection, agenda_item_id: &str) -> Result<Tally> {
        let mut stmt = conn.prepare(
            "SELECT value, COUNT(*) FROM votes WHERE agenda_item_id = ?1 GROUP BY value",
        )?;
        let rows = stmt.query_map(params![agenda_item_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut tally = Tally::default();
        for row in rows {
            let (value, count) = row?;
            match value.as_str() {
                "yes" => tally.yes = count,
                "no" => tally.no = count,
                "abstain" => tally.abstain = count,
                _ => {}
            }
        }
        Ok(tally)
    }

    /// All votes on an item, oldest cast first.
    pub fn list_for_item(conn: &Connection, agenda_item_id: &str) -> Result<Vec<Vote>> {
        let mut stmt = conn
            .prepare("SELECT * FROM votes WHERE agenda_item_id = ?1 ORDER BY cast_at ASC, id ASC")?;
        let rows = stmt
            .query_map(params![agenda_item_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vote> {
        let value: String = row.get("value")?;
        // value is column 3 in SELECT * order
        let value = value.parse::<VoteValue>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Vote {
            id: row.get::<_, String>("id")?.into(),
            agenda_item_id: row.get::<_, String>("agenda_item_id")?.into(),
            voter_id: row.get::<_, String>("voter_id")?.into(),
            value,
            comment: row.get("comment")?,
            cast_at: row.get("cast_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
