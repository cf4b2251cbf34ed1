//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON wire
//! format. Each type implements [`Default`] with production default values.
//! Types marked with `#[serde(default)]` allow partial JSON: missing fields
//! get their default value during deserialization.

use plenum_core::Role;
use serde::{Deserialize, Serialize};

/// Root settings type for the Plenum server.
///
/// Loaded from `~/.plenum/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// All field names are camelCase. Example:
///
/// ```json
/// {
///   "server": { "port": 9420 },
///   "governance": { "quorum": 5 },
///   "roster": [{ "id": "alice", "displayName": "Alice", "role": "founder" }]
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlenumSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// Server network settings.
    pub server: ServerSettings,
    /// Quorum and reminder policy.
    pub governance: GovernanceSettings,
    /// Minutes generation collaborators.
    pub minutes: MinutesSettings,
    /// Known participants for the static directory.
    pub roster: Vec<RosterEntry>,
}

impl Default for PlenumSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "plenum".to_string(),
            server: ServerSettings::default(),
            governance: GovernanceSettings::default(),
            minutes: MinutesSettings::default(),
            roster: Vec::new(),
        }
    }
}

/// Server network and runtime settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// HTTP + WebSocket port.
    pub port: u16,
    /// Path to the SQLite database (relative to `~/.plenum`).
    pub db_path: String,
    /// Maximum number of concurrent WebSocket connections.
    pub max_connections: usize,
    /// WebSocket heartbeat ping interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Seconds without a pong before a connection is considered dead.
    pub heartbeat_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8420,
            db_path: "plenum.db".to_string(),
            max_connections: 64,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
        }
    }
}

/// Quorum and reminder policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GovernanceSettings {
    /// Minimum open attendance for a meeting to have quorum.
    pub quorum: u32,
    /// How far ahead (hours) the reminder sweep looks for planned meetings.
    pub reminder_window_hours: u32,
    /// How often (seconds) the reminder sweep runs.
    pub reminder_interval_secs: u64,
}

impl Default for GovernanceSettings {
    fn default() -> Self {
        Self {
            quorum: 3,
            reminder_window_hours: 48,
            reminder_interval_secs: 900,
        }
    }
}

/// Minutes generation collaborator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinutesSettings {
    /// Base URL of the text-generation service.
    pub text_base_url: String,
    /// Base URL of the document-rendering service.
    pub render_base_url: String,
    /// Model identifier sent to the text-generation service.
    pub model: String,
    /// API key for the text-generation service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds for both collaborators.
    pub timeout_ms: u64,
}

impl Default for MinutesSettings {
    fn default() -> Self {
        Self {
            text_base_url: "http://127.0.0.1:8030".to_string(),
            render_base_url: "http://127.0.0.1:8040".to_string(),
            model: "gpt-4".to_string(),
            api_key: None,
            timeout_ms: 30_000,
        }
    }
}

/// A known participant in the static directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// Participant ID used in RPC params and attendance rows.
    pub id: String,
    /// Human-readable name shown in events and minutes.
    pub display_name: String,
    /// Directory role.
    pub role: Role,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
