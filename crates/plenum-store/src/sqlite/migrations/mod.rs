//! Schema migrations for the meeting database.
//!
//! Each migration is a SQL file embedded with [`include_str!`] and applied
//! inside its own transaction, so a failure leaves no partial schema behind.
//! Applied versions are recorded in the `schema_version` ledger, which makes
//! [`run_migrations`] safe to call on every startup: anything already
//! recorded is skipped.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::{Result, StoreError};

/// One versioned schema change.
struct Migration {
    version: u32,
    label: &'static str,
    sql: &'static str,
}

/// Every migration, in ascending version order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    label: "baseline schema: meetings, agenda, attendance, votes, messages",
    sql: include_str!("v001_schema.sql"),
}];

/// Bring the database up to the latest schema version.
///
/// Applies every migration newer than what the `schema_version` ledger
/// records, each in its own transaction, and returns the version the
/// database is now at.
///
/// # Errors
///
/// Returns [`StoreError::Migration`] if any migration SQL fails; the
/// failing migration is rolled back and the ledger is left untouched.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    ensure_ledger(conn)?;
    let start = current_version(conn)?;
    let mut version = start;
    let mut applied = 0_u32;

    for migration in MIGRATIONS.iter().filter(|m| m.version > start) {
        info!(
            version = migration.version,
            label = migration.label,
            "applying migration"
        );
        apply(conn, migration)?;
        version = migration.version;
        applied += 1;
    }

    if applied == 0 {
        debug!(version, "schema already up to date");
    } else {
        info!(applied, version, "schema migrated");
    }

    Ok(version)
}

/// Highest version recorded in the `schema_version` ledger, or 0 for a
/// fresh database.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| migration_error(format!("reading schema_version: {e}")))
}

/// Newest migration version this build knows about.
pub fn latest_version() -> u32 {
    MIGRATIONS.iter().map(|m| m.version).max().unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal
// ─────────────────────────────────────────────────────────────────────────────

fn migration_error(message: String) -> StoreError {
    StoreError::Migration { message }
}

fn ensure_ledger(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
           version     INTEGER PRIMARY KEY,
           applied_at  TEXT    NOT NULL,
           description TEXT
         );",
    )
    .map_err(|e| migration_error(format!("creating schema_version ledger: {e}")))
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction().map_err(|e| {
        migration_error(format!(
            "opening transaction for v{}: {e}",
            migration.version
        ))
    })?;

    tx.execute_batch(migration.sql).map_err(|e| {
        migration_error(format!(
            "v{} ({}): {e}",
            migration.version, migration.label
        ))
    })?;

    let _ = tx
        .execute(
            "INSERT INTO schema_version (version, applied_at, description)
             VALUES (?1, datetime('now'), ?2)",
            rusqlite::params![migration.version, migration.label],
        )
        .map_err(|e| migration_error(format!("recording v{}: {e}", migration.version)))?;

    tx.commit()
        .map_err(|e| migration_error(format!("committing v{}: {e}", migration.version)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
