//! # plenum-settings
//!
//! Layered configuration for the Plenum server.
//!
//! The effective settings are the compiled [`PlenumSettings::default`] with
//! the founders' `~/.plenum/settings.json` deep-merged on top and `PLENUM_*`
//! environment variables applied last, so an operator can always override a
//! file value without editing it.
//!
//! # Usage
//!
//! ```no_run
//! let settings = plenum_settings::load_settings().unwrap_or_default();
//! println!("listening on {}:{}", settings.server.host, settings.server.port);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::SettingsError;
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{
    GovernanceSettings, MinutesSettings, PlenumSettings, RosterEntry, ServerSettings,
};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
