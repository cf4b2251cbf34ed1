//! RPC method handlers, one module per method family.
//!
//! Handlers are pure request processors: they validate params, check the
//! role gate, and call the engine. Connection-level effects of a result
//! (room membership, participant binding) belong to the gateway.

use plenum_engine::Profile;
use serde_json::Value;

use crate::rpc::context::RpcContext;
use crate::rpc::errors::{PARTICIPANT_NOT_FOUND, RpcError};
use crate::rpc::registry::RpcRegistry;
use crate::rpc::validation::{validate_param_length, validate_string_param};

pub mod agenda;
pub mod chat;
pub mod meeting;
pub mod minutes;
pub mod room;
pub mod system;
pub mod vote;

/// Register every method this server speaks.
pub fn register_all(registry: &mut RpcRegistry) {
    registry.register("meeting.create", meeting::CreateMeetingHandler);
    registry.register("meeting.get", meeting::GetMeetingHandler);
    registry.register("meeting.list", meeting::ListMeetingsHandler);
    registry.register("meeting.update", meeting::UpdateMeetingHandler);
    registry.register("meeting.activate", meeting::ActivateMeetingHandler);
    registry.register("meeting.complete", meeting::CompleteMeetingHandler);
    registry.register("meeting.cancel", meeting::CancelMeetingHandler);
    registry.register("agenda.add", agenda::AddAgendaItemHandler);
    registry.register("agenda.list", agenda::ListAgendaHandler);
    registry.register("agenda.remove", agenda::RemoveAgendaItemHandler);
    registry.register("vote.cast", vote::CastVoteHandler);
    registry.register("vote.tally", vote::VoteTallyHandler);
    registry.register("chat.send", chat::SendMessageHandler);
    registry.register("chat.history", chat::ChatHistoryHandler);
    registry.register("room.subscribe", room::SubscribeRoomHandler);
    registry.register("room.unsubscribe", room::UnsubscribeRoomHandler);
    registry.register("minutes.generate", minutes::GenerateMinutesHandler);
    registry.register("system.ping", system::PingHandler);
}

/// Extract a required string parameter.
pub(crate) fn require_string(params: Option<&Value>, name: &str) -> Result<String, RpcError> {
    let value = params
        .and_then(|p| p.get(name))
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params(format!("'{name}' is required")))?;
    validate_string_param(value, name)?;
    Ok(value.to_string())
}

/// Extract an optional string parameter. `null` counts as absent.
pub(crate) fn optional_string(params: Option<&Value>, name: &str) -> Result<Option<String>, RpcError> {
    match params.and_then(|p| p.get(name)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => {
            validate_param_length(value, name)?;
            Ok(Some(value.clone()))
        }
        Some(_) => Err(RpcError::invalid_params(format!("'{name}' must be a string"))),
    }
}

/// Extract a required boolean parameter.
pub(crate) fn require_bool(params: Option<&Value>, name: &str) -> Result<bool, RpcError> {
    params
        .and_then(|p| p.get(name))
        .and_then(Value::as_bool)
        .ok_or_else(|| RpcError::invalid_params(format!("'{name}' is required and must be a boolean")))
}

/// Resolve a participant and require the founder role.
///
/// Runs before the engine is touched, so an unauthorized request has no
/// side effects at all.
pub(crate) async fn require_founder(
    ctx: &RpcContext,
    participant_id: &str,
) -> Result<Profile, RpcError> {
    let profile = lookup_participant(ctx, participant_id).await?;
    if !profile.is_founder() {
        return Err(RpcError::PermissionDenied {
            message: format!("participant '{participant_id}' is not a founder"),
        });
    }
    Ok(profile)
}

/// Resolve a participant through the directory.
pub(crate) async fn lookup_participant(
    ctx: &RpcContext,
    participant_id: &str,
) -> Result<Profile, RpcError> {
    ctx.directory
        .lookup(participant_id)
        .await
        .ok_or_else(|| RpcError::NotFound {
            code: PARTICIPANT_NOT_FOUND,
            message: format!("participant '{participant_id}' is not on the roster"),
        })
}
