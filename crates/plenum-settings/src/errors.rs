//! Error surface for settings loading.

use thiserror::Error;

/// Failure modes while loading the layered configuration.
///
/// Range violations in env overrides are not errors (the loader warns and
/// keeps the previous value), so only file-level problems surface here.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("reading settings file: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid JSON, or the merged document does
    /// not deserialize into the settings shape.
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_wrap_their_sources() {
        let io: SettingsError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(io, SettingsError::Io(_)));
        assert!(io.to_string().contains("denied"));

        let json: SettingsError = serde_json::from_str::<serde_json::Value>("{bad}")
            .unwrap_err()
            .into();
        assert!(matches!(json, SettingsError::Json(_)));
        assert!(json.to_string().contains("not valid JSON"));
    }
}
