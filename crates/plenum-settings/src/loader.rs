//! Layered settings loading.
//!
//! [`load_settings`] builds the effective configuration in three passes:
//! compiled defaults first, the user's `~/.plenum/settings.json` deep-merged
//! on top, then `PLENUM_*` environment overrides. Later layers win; an
//! override that fails validation is logged and skipped rather than taking
//! down startup.
//!
//! Merge semantics: objects combine key by key, anything else (arrays,
//! strings, numbers) is replaced wholesale, and explicit `null`s in the
//! user file leave the default in place.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::PlenumSettings;

/// Location of the user settings file (`~/.plenum/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    Path::new(&home).join(".plenum/settings.json")
}

/// Load settings from the default path, env overrides applied.
pub fn load_settings() -> Result<PlenumSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from `path`, env overrides applied.
///
/// A missing file yields the compiled defaults. A file that is present but
/// fails to parse is an error, never a silent fallback to defaults.
pub fn load_settings_from_path(path: &Path) -> Result<PlenumSettings> {
    let mut layered = serde_json::to_value(PlenumSettings::default())?;

    if path.exists() {
        debug!(?path, "merging settings file over defaults");
        let raw = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&raw)?;
        layered = deep_merge(layered, user);
    } else {
        debug!(?path, "no settings file, starting from defaults");
    }

    let mut settings: PlenumSettings = serde_json::from_value(layered)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Merge `overlay` into `base` and return the combined value.
///
/// Objects combine recursively. Any other overlay value replaces the base
/// outright, and `null` overlay entries are dropped so a user file can
/// mention a key without erasing its default.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(entries)) => {
            for (key, incoming) in entries {
                if incoming.is_null() {
                    continue;
                }
                let value = match merged.remove(&key) {
                    Some(current) => deep_merge(current, incoming),
                    None => incoming,
                };
                let _ = merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (_, replacement) => replacement,
    }
}

/// Fold `PLENUM_*` environment variables into `settings`.
///
/// Numeric overrides are range-checked; anything unparsable or out of range
/// is logged and ignored, leaving the file/default value in place.
pub fn apply_env_overrides(settings: &mut PlenumSettings) {
    // ── Server settings ─────────────────────────────────────────────
    if let Some(v) = env_string("PLENUM_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env_ranged("PLENUM_PORT", 1, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = env_string("PLENUM_DB_PATH") {
        settings.server.db_path = v;
    }
    if let Some(v) = env_ranged("PLENUM_MAX_CONNECTIONS", 1, 10_000) {
        settings.server.max_connections = v;
    }
    if let Some(v) = env_ranged("PLENUM_HEARTBEAT_INTERVAL", 1, 3600) {
        settings.server.heartbeat_interval_secs = v;
    }
    if let Some(v) = env_ranged("PLENUM_HEARTBEAT_TIMEOUT", 1, 86_400) {
        settings.server.heartbeat_timeout_secs = v;
    }

    // ── Governance settings ─────────────────────────────────────────
    if let Some(v) = env_ranged("PLENUM_QUORUM", 1, 1000) {
        settings.governance.quorum = v;
    }
    if let Some(v) = env_ranged("PLENUM_REMINDER_WINDOW_HOURS", 1, 720) {
        settings.governance.reminder_window_hours = v;
    }
    if let Some(v) = env_ranged("PLENUM_REMINDER_INTERVAL_SECS", 10, 86_400) {
        settings.governance.reminder_interval_secs = v;
    }

    // ── Minutes settings ────────────────────────────────────────────
    if let Some(v) = env_string("PLENUM_MINUTES_TEXT_URL") {
        settings.minutes.text_base_url = v;
    }
    if let Some(v) = env_string("PLENUM_MINUTES_RENDER_URL") {
        settings.minutes.render_base_url = v;
    }
    if let Some(v) = env_string("PLENUM_MINUTES_MODEL") {
        settings.minutes.model = v;
    }
    if let Some(v) = env_string("PLENUM_MINUTES_API_KEY") {
        settings.minutes.api_key = Some(v);
    }
    if let Some(v) = env_ranged("PLENUM_MINUTES_TIMEOUT_MS", 1000, 600_000) {
        settings.minutes.timeout_ms = v;
    }
}

// ── Env readers ─────────────────────────────────────────────────────────────

fn parse_ranged<T>(raw: &str, min: T, max: T) -> Option<T>
where
    T: FromStr + PartialOrd,
{
    let n: T = raw.parse().ok()?;
    (min <= n && n <= max).then_some(n)
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_ranged<T>(name: &str, min: T, max: T) -> Option<T>
where
    T: FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let raw = std::env::var(name).ok()?;
    let parsed = parse_ranged(&raw, min, max);
    if parsed.is_none() {
        warn!(key = name, value = %raw, min = %min, max = %max, "ignoring invalid override");
    }
    parsed
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
