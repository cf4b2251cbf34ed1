//! Minutes handler: operator retry of the protocol assembler.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::handlers::{require_founder, require_string};
use crate::rpc::registry::RpcMethod;

/// Re-run minutes generation for a completed meeting.
///
/// Completion already attempts it once; this is the recovery path when a
/// collaborator was down, and it works at any later time.
pub struct GenerateMinutesHandler;

#[async_trait]
impl RpcMethod for GenerateMinutesHandler {
    #[instrument(skip(self, ctx), fields(method = "minutes.generate"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let meeting_id = require_string(params, "meetingId")?;
        let actor_id = require_string(params, "actorId")?;
        let _ = require_founder(ctx, &actor_id).await?;

        let meeting = ctx.engine.generate_minutes(&meeting_id).await?;
        Ok(serde_json::json!({ "meeting": meeting }))
    }
}
