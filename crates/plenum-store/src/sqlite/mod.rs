//! `SQLite` backend for the meeting store.
//!
//! Provides connection pooling, schema migrations, and repository
//! implementations for all database operations. The schema is created by a
//! single comprehensive migration: tables, `CHECK` constraints, and the
//! unique indexes that enforce one-open-attendance and one-vote-per-voter.
//!
//! # Architecture
//!
//! - **[`connection`]**: `r2d2` connection pool with WAL mode, foreign keys,
//!   and performance pragmas applied to every connection.
//! - **[`migrations`]**: Version-tracked schema evolution. Migrations are
//!   embedded at compile time and run transactionally.
//! - **[`repositories`]**: Stateless repository structs. Each method takes
//!   `&Connection` and executes SQL. No shared mutable state. Rows map
//!   directly into the domain types from `plenum-core`.

pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{file_pool, memory_pool, ConnectionConfig, ConnectionPool, PooledConnection};
pub use migrations::{current_version, latest_version, run_migrations};
