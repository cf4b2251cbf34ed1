//! Axum HTTP + WebSocket server.
//!
//! Three routes: `/ws` upgrades into an RPC session, `/health` reports
//! liveness counters, `/metrics` renders the Prometheus recorder. The
//! listener task shuts down when the coordinator's token fires.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub use crate::config::ServerConfig;
use crate::health::HealthResponse;
use crate::metrics::WS_REJECTED_CONNECTIONS_TOTAL;
use crate::rpc::context::RpcContext;
use crate::rpc::registry::RpcRegistry;
use crate::shutdown::ShutdownHandle;
use crate::websocket::broadcast::RoomBroadcaster;
use crate::websocket::session::run_ws_session;

/// Shared state accessible from every route.
#[derive(Clone)]
pub struct AppState {
    /// RPC method registry.
    pub registry: Arc<RpcRegistry>,
    /// Dependencies shared with method handlers.
    pub ctx: RpcContext,
    /// Connection and room registry for event fan-out.
    pub broadcaster: Arc<RoomBroadcaster>,
    /// Runtime server configuration.
    pub config: Arc<ServerConfig>,
    /// Render handle for the installed Prometheus recorder.
    pub metrics: PrometheusHandle,
}

/// The gateway: owns the shared state and the shutdown coordinator.
pub struct PlenumServer {
    state: AppState,
    shutdown: Arc<ShutdownHandle>,
}

impl PlenumServer {
    /// Assemble a server from its parts.
    pub fn new(
        config: ServerConfig,
        registry: RpcRegistry,
        ctx: RpcContext,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            state: AppState {
                registry: Arc::new(registry),
                ctx,
                broadcaster: Arc::new(RoomBroadcaster::new()),
                config: Arc::new(config),
                metrics,
            },
            shutdown: Arc::new(ShutdownHandle::new()),
        }
    }

    /// Router over this server's shared state.
    pub fn router(&self) -> Router {
        app_router(self.state.clone())
    }

    /// Bind the configured address and serve until shutdown.
    ///
    /// Returns the bound address (useful with port `0`) and the serve
    /// task's handle.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;

        let router = self.router();
        let token = self.shutdown.signal();
        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned());
            if let Err(err) = serve.await {
                error!(error = %err, "server exited abnormally");
            }
        });

        info!(addr = %local_addr, "server listening");
        Ok((local_addr, handle))
    }

    /// The broadcaster, for wiring the event bridge.
    pub fn broadcaster(&self) -> &Arc<RoomBroadcaster> {
        &self.state.broadcaster
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownHandle> {
        &self.shutdown
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// The method registry.
    pub fn registry(&self) -> &Arc<RpcRegistry> {
        &self.state.registry
    }
}

/// Routes: WebSocket upgrade, liveness, Prometheus exposition.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(upgrade_ws))
        .route("/health", get(serve_health))
        .route("/metrics", get(serve_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// `GET /ws`: upgrade into an RPC session, unless the server is full.
async fn upgrade_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let open = state.broadcaster.connection_count().await;
    if open >= state.config.max_connections {
        counter!(WS_REJECTED_CONNECTIONS_TOTAL).increment(1);
        warn!(
            open,
            limit = state.config.max_connections,
            "connection limit reached, refusing upgrade"
        );
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    ws.on_upgrade(move |socket| run_ws_session(socket, state))
}

/// `GET /health`: liveness counters as JSON.
async fn serve_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.broadcaster.connection_count().await;
    let rooms = state.broadcaster.room_count().await;
    Json(HealthResponse::snapshot(state.ctx.started_at, connections, rooms))
}

/// `GET /metrics`: Prometheus exposition format.
async fn serve_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::render(&state.metrics),
    )
}
