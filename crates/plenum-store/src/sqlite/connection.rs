//! `SQLite` connection pooling.
//!
//! Every connection runs the same pragma batch on acquire: WAL journaling,
//! foreign keys on, NORMAL synchronous, and a busy timeout so concurrent
//! writers wait instead of failing fast.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::Result;

/// Pool of `SQLite` connections sharing one pragma setup.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// One checked-out connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool tuning knobs for file-backed databases.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Connections kept in the pool.
    pub pool_size: u32,
    /// How long a writer waits on a locked database before erroring.
    pub busy_timeout_ms: u32,
    /// Page cache per connection, in KiB.
    pub cache_size_kib: i64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { pool_size: 16, busy_timeout_ms: 30_000, cache_size_kib: 8192 }
    }
}

#[derive(Debug)]
struct PragmaSetup {
    busy_timeout_ms: u32,
    cache_size_kib: i64,
}

impl PragmaSetup {
    fn batch(&self) -> String {
        format!(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = {};
             PRAGMA foreign_keys = ON;
             PRAGMA cache_size = -{};
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms, self.cache_size_kib
        )
    }
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaSetup {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&self.batch())
    }
}

fn build(
    manager: SqliteConnectionManager,
    max_size: u32,
    pragmas: PragmaSetup,
) -> Result<ConnectionPool> {
    Ok(Pool::builder()
        .max_size(max_size)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .connection_customizer(Box::new(pragmas))
        .build(manager)?)
}

/// Open a pool over a database file, creating the file if absent.
pub fn file_pool(path: &str, config: &ConnectionConfig) -> Result<ConnectionPool> {
    build(
        SqliteConnectionManager::file(path),
        config.pool_size,
        PragmaSetup {
            busy_timeout_ms: config.busy_timeout_ms,
            cache_size_kib: config.cache_size_kib,
        },
    )
}

/// Open an in-memory database for tests.
///
/// The pool is capped at one connection: every `:memory:` connection is its
/// own database, so a second checkout would see empty tables.
pub fn memory_pool() -> Result<ConnectionPool> {
    let defaults = ConnectionConfig::default();
    build(
        SqliteConnectionManager::memory(),
        1,
        PragmaSetup {
            busy_timeout_ms: defaults.busy_timeout_ms,
            cache_size_kib: defaults.cache_size_kib,
        },
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
