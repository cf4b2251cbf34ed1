//! Voting handlers: cast and tally.

use async_trait::async_trait;
use plenum_core::types::VoteValue;
use plenum_engine::CastVoteRequest;
use serde_json::Value;
use tracing::instrument;

use crate::rpc::context::RpcContext;
use crate::rpc::errors::RpcError;
use crate::rpc::handlers::{optional_string, require_founder, require_string};
use crate::rpc::registry::RpcMethod;

/// Cast or replace a ballot on a voting-enabled agenda item.
pub struct CastVoteHandler;

#[async_trait]
impl RpcMethod for CastVoteHandler {
    #[instrument(skip(self, ctx), fields(method = "vote.cast"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params.as_ref();
        let agenda_item_id = require_string(params, "agendaItemId")?;
        let voter_id = require_string(params, "voterId")?;
        let _ = require_founder(ctx, &voter_id).await?;
        let value = require_string(params, "value")?
            .parse::<VoteValue>()
            .map_err(|err| RpcError::invalid_params(err.to_string()))?;
        let comment = optional_string(params, "comment")?;

        let ack = ctx
            .engine
            .cast_vote(&CastVoteRequest {
                agenda_item_id,
                voter_id,
                value,
                comment,
            })
            .await?;
        Ok(serde_json::json!({
            "vote": ack.vote,
            "tally": ack.tally,
            "outcome": ack.tally.outcome(),
        }))
    }
}

/// Read the current tally for an agenda item.
pub struct VoteTallyHandler;

#[async_trait]
impl RpcMethod for VoteTallyHandler {
    #[instrument(skip(self, ctx), fields(method = "vote.tally"))]
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let agenda_item_id = require_string(params.as_ref(), "agendaItemId")?;
        let tally = ctx.engine.vote_tally(&agenda_item_id)?;
        Ok(serde_json::json!({
            "tally": tally,
            "outcome": tally.outcome(),
        }))
    }
}
