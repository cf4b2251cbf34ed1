//! Chat handlers: send and history.

use async_trait::async_trait;
use plenum_engine::SendMessageRequest;
use serde_json::Value;
use tracing::instrument;

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::handlers::{require_founder, require_string};
use crate::rpc::registry::RpcMethod;

/// Persist a chat message in an active meeting.
pub struct SendMessageHandler;

#[async_trait]
impl RpcMethod for SendMessageHandler {
    #[instrument(skip(self, ctx), fields(method = "chat.send"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let meeting_id = require_string(params, "meetingId")?;
        let sender_id = require_string(params, "senderId")?;
        let _ = require_founder(ctx, &sender_id).await?;
        let content = require_string(params, "content")?;

        let message = ctx
            .engine
            .send_message(&SendMessageRequest {
                meeting_id,
                sender_id,
                content,
            })
            .await?;
        Ok(serde_json::json!({ "message": message }))
    }
}

/// Fetch a meeting's transcript in send order.
pub struct ChatHistoryHandler;

#[async_trait]
impl RpcMethod for ChatHistoryHandler {
    #[instrument(skip(self, ctx), fields(method = "chat.history"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let meeting_id = require_string(params.as_ref(), "meetingId")?;
        let messages = ctx.engine.chat_history(&meeting_id)?;
        Ok(serde_json::json!({ "messages": messages }))
    }
}
