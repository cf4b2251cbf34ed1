//! Agenda handlers: add, list, remove.

use async_trait::async_trait;
use plenum_engine::AddAgendaItemRequest;
use serde_json::Value;
use tracing::instrument;

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::handlers::{optional_string, require_bool, require_founder, require_string};
use crate::rpc::registry::RpcMethod;

/// Append an agenda item to a planned or active meeting.
pub struct AddAgendaItemHandler;

#[async_trait]
impl RpcMethod for AddAgendaItemHandler {
    #[instrument(skip(self, ctx), fields(method = "agenda.add"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let meeting_id = require_string(params, "meetingId")?;
        let actor_id = require_string(params, "actorId")?;
        let _ = require_founder(ctx, &actor_id).await?;
        let title = require_string(params, "title")?;
        let description = optional_string(params, "description")?;
        let requires_voting = require_bool(params, "requiresVoting")?;

        let item = ctx
            .engine
            .add_agenda_item(&AddAgendaItemRequest {
                meeting_id,
                title,
                description,
                requires_voting,
            })
            .await?;
        Ok(serde_json::json!({ "agendaItem": item }))
    }
}

/// List a meeting's agenda in position order.
pub struct ListAgendaHandler;

#[async_trait]
impl RpcMethod for ListAgendaHandler {
    #[instrument(skip(self, ctx), fields(method = "agenda.list"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let meeting_id = require_string(params.as_ref(), "meetingId")?;
        let items = ctx.engine.list_agenda(&meeting_id)?;
        Ok(serde_json::json!({ "agendaItems": items }))
    }
}

/// Remove an agenda item from a planned meeting.
pub struct RemoveAgendaItemHandler;

#[async_trait]
impl RpcMethod for RemoveAgendaItemHandler {
    #[instrument(skip(self, ctx), fields(method = "agenda.remove"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let agenda_item_id = require_string(params, "agendaItemId")?;
        let actor_id = require_string(params, "actorId")?;
        let _ = require_founder(ctx, &actor_id).await?;

        ctx.engine.remove_agenda_item(&agenda_item_id).await?;
        Ok(serde_json::json!({ "removed": true }))
    }
}
