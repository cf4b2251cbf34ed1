//! Prometheus recorder setup and the metric names this crate emits.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// RPC requests dispatched, labeled by method.
pub const RPC_REQUESTS_TOTAL: &str = "rpc_requests_total";
/// RPC requests that failed, labeled by method and code.
pub const RPC_ERRORS_TOTAL: &str = "rpc_errors_total";
/// Handler latency in seconds, labeled by method.
pub const RPC_REQUEST_DURATION_SECONDS: &str = "rpc_request_duration_seconds";
/// WebSocket connections accepted since start.
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket connections closed since start.
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Upgrades refused because the connection limit was reached.
pub const WS_REJECTED_CONNECTIONS_TOTAL: &str = "ws_rejected_connections_total";
/// Currently open WebSocket connections.
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Lifetime of a closed connection in seconds.
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Frames dropped because a connection's send queue was full.
pub const WS_BROADCAST_DROPS_TOTAL: &str = "ws_broadcast_drops_total";
/// Room events the bridge missed because it lagged the engine stream.
pub const WS_BRIDGE_LAGGED_EVENTS_TOTAL: &str = "ws_bridge_lagged_events_total";

/// Install the global Prometheus recorder and return its render handle.
///
/// Call once at startup, before anything emits a metric.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Render the current metric state in the Prometheus exposition format.
#[must_use]
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}
