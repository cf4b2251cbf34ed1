//! Room handlers: subscribe and unsubscribe.
//!
//! Subscribe performs the attendance join; the gateway inspects the
//! successful result and attaches the connection to the room afterwards.
//! Unsubscribe only validates and echoes; detaching the channel, and the
//! attendance leave when it was the participant's last one, happen in the
//! gateway where the channel is known.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::handlers::{lookup_participant, require_founder, require_string};
use crate::rpc::registry::RpcMethod;

/// Join a meeting's room (and its attendance) on this connection.
pub struct SubscribeRoomHandler;

#[async_trait]
impl RpcMethod for SubscribeRoomHandler {
    #[instrument(skip(self, ctx), fields(method = "room.subscribe"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let meeting_id = require_string(params, "meetingId")?;
        let participant_id = require_string(params, "participantId")?;
        let _ = require_founder(ctx, &participant_id).await?;

        let ack = ctx.engine.join_meeting(&meeting_id, &participant_id).await?;
        Ok(serde_json::json!({
            "meetingId": meeting_id,
            "participantId": participant_id,
            "newlyJoined": ack.newly_joined,
            "attendeeCount": ack.attendee_count,
            "attendance": ack.record,
        }))
    }
}

/// Detach this connection's channel from a meeting's room.
pub struct UnsubscribeRoomHandler;

#[async_trait]
impl RpcMethod for UnsubscribeRoomHandler {
    #[instrument(skip(self, ctx), fields(method = "room.unsubscribe"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let meeting_id = require_string(params, "meetingId")?;
        let participant_id = require_string(params, "participantId")?;
        let _ = lookup_participant(ctx, &participant_id).await?;
        let _ = ctx.engine.get_meeting(&meeting_id)?;

        Ok(serde_json::json!({
            "meetingId": meeting_id,
            "participantId": participant_id,
            "unsubscribed": true,
        }))
    }
}
