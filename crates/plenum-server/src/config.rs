//! Runtime server configuration.

use std::time::Duration;

/// Configuration for the gateway.
///
/// This is the runtime shape: durations are real [`Duration`]s. The
/// serde-facing settings file keeps second counts and the binary converts.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind address; loopback unless configured otherwise.
    pub host: String,
    /// Bind port; `0` lets the OS pick (the test harness relies on this).
    pub port: u16,
    /// Connection cap; upgrade requests past it are refused with 503.
    pub max_connections: usize,
    /// Ping cadence for connection liveness.
    pub heartbeat_interval: Duration,
    /// Silence window after which a connection is presumed dead.
    pub heartbeat_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 0,
            max_connections: 64,
            heartbeat_interval: Duration::from_secs(30),
            heartbeat_timeout: Duration::from_secs(90),
        }
    }
}
