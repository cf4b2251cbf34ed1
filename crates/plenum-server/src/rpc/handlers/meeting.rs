//! Meeting lifecycle handlers: create, get, list, update, activate,
//! complete, cancel.

use async_trait::async_trait;
use plenum_core::types::MeetingStatus;
use plenum_engine::{CreateMeetingRequest, UpdateMeetingRequest};
use serde_json::Value;
use tracing::instrument;

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::handlers::{optional_string, require_founder, require_string};
use crate::rpc::registry::RpcMethod;
use crate::rpc::validation::validate_rfc3339;

/// Create a planned meeting.
pub struct CreateMeetingHandler;

#[async_trait]
impl RpcMethod for CreateMeetingHandler {
    #[instrument(skip(self, ctx), fields(method = "meeting.create"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let creator_id = require_string(params, "creatorId")?;
        let _ = require_founder(ctx, &creator_id).await?;
        let title = require_string(params, "title")?;
        let description = optional_string(params, "description")?;
        let scheduled_for = require_string(params, "scheduledFor")?;
        validate_rfc3339(&scheduled_for, "scheduledFor")?;

        let meeting = ctx.engine.create_meeting(&CreateMeetingRequest {
            title,
            description,
            scheduled_for,
            creator_id,
        })?;
        Ok(serde_json::json!({ "meeting": meeting }))
    }
}

/// Fetch one meeting by id.
pub struct GetMeetingHandler;

#[async_trait]
impl RpcMethod for GetMeetingHandler {
    #[instrument(skip(self, ctx), fields(method = "meeting.get"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let meeting_id = require_string(params.as_ref(), "meetingId")?;
        let meeting = ctx.engine.get_meeting(&meeting_id)?;
        Ok(serde_json::json!({ "meeting": meeting }))
    }
}

/// List meetings, optionally filtered by status.
pub struct ListMeetingsHandler;

#[async_trait]
impl RpcMethod for ListMeetingsHandler {
    #[instrument(skip(self, ctx), fields(method = "meeting.list"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let status = match optional_string(params.as_ref(), "status")? {
            Some(raw) => Some(
                raw.parse::<MeetingStatus>()
                    .map_err(|err| RpcError::invalid_params(err.to_string()))?,
            ),
            None => None,
        };
        let meetings = ctx.engine.list_meetings(status)?;
        Ok(serde_json::json!({ "meetings": meetings }))
    }
}

/// Edit a planned meeting's details.
pub struct UpdateMeetingHandler;

#[async_trait]
impl RpcMethod for UpdateMeetingHandler {
    #[instrument(skip(self, ctx), fields(method = "meeting.update"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let meeting_id = require_string(params, "meetingId")?;
        let actor_id = require_string(params, "actorId")?;
        let _ = require_founder(ctx, &actor_id).await?;

        let scheduled_for = optional_string(params, "scheduledFor")?;
        if let Some(value) = &scheduled_for {
            validate_rfc3339(value, "scheduledFor")?;
        }
        let request = UpdateMeetingRequest {
            title: optional_string(params, "title")?,
            description: optional_string(params, "description")?,
            scheduled_for,
        };
        let meeting = ctx.engine.update_meeting(&meeting_id, &request).await?;
        Ok(serde_json::json!({ "meeting": meeting }))
    }
}

/// Move a planned meeting to active.
pub struct ActivateMeetingHandler;

#[async_trait]
impl RpcMethod for ActivateMeetingHandler {
    #[instrument(skip(self, ctx), fields(method = "meeting.activate"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let meeting_id = require_string(params, "meetingId")?;
        let actor_id = require_string(params, "actorId")?;
        let _ = require_founder(ctx, &actor_id).await?;

        let meeting = ctx.engine.activate_meeting(&meeting_id).await?;
        Ok(serde_json::json!({ "meeting": meeting }))
    }
}

/// Complete an active meeting and kick off minutes generation.
pub struct CompleteMeetingHandler;

#[async_trait]
impl RpcMethod for CompleteMeetingHandler {
    #[instrument(skip(self, ctx), fields(method = "meeting.complete"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let meeting_id = require_string(params, "meetingId")?;
        let actor_id = require_string(params, "actorId")?;
        let _ = require_founder(ctx, &actor_id).await?;

        let meeting = ctx.engine.complete_meeting(&meeting_id).await?;
        Ok(serde_json::json!({ "meeting": meeting }))
    }
}

/// Cancel a planned or active meeting.
pub struct CancelMeetingHandler;

#[async_trait]
impl RpcMethod for CancelMeetingHandler {
    #[instrument(skip(self, ctx), fields(method = "meeting.cancel"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let meeting_id = require_string(params, "meetingId")?;
        let actor_id = require_string(params, "actorId")?;
        let _ = require_founder(ctx, &actor_id).await?;

        let meeting = ctx.engine.cancel_meeting(&meeting_id).await?;
        Ok(serde_json::json!({ "meeting": meeting }))
    }
}
