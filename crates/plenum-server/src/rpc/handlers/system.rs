//! System handler: liveness ping.

use async_trait::async_trait;
use plenum_core::constants::VERSION;
use serde_json::Value;
use tracing::instrument;

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::registry::RpcMethod;

/// Application-level ping, independent of WebSocket heartbeats.
pub struct PingHandler;

#[async_trait]
impl RpcMethod for PingHandler {
    #[instrument(skip(self, ctx), fields(method = "system.ping"))]
    async fn invoke(&self, _params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        Ok(serde_json::json!({
            "status": "ok",
            "version": VERSION,
            "uptimeSecs": ctx.started_at.elapsed().as_secs(),
        }))
    }
}
