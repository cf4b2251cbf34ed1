//! Wire types for the RPC envelope and server-initiated room events.
//!
//! Everything here is serialized with camelCase keys. The shapes are part
//! of the client contract and must not drift.

use plenum_core::events::RoomEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An incoming RPC request frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcRequest {
    /// Client-chosen correlation id, echoed back on the response.
    pub id: String,
    /// Method name, e.g. `meeting.create`.
    pub method: String,
    /// Method parameters. Missing and `null` are equivalent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// An outgoing RPC response frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcResponse {
    /// Correlation id from the request, `"unknown"` if it never parsed.
    pub id: String,
    /// Whether the call succeeded.
    pub success: bool,
    /// Method result, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error body, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

impl RpcResponse {
    /// Build a success response.
    #[must_use]
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self { id: id.into(), success: true, result: Some(result), error: None }
    }

    /// Build a failure response from an error body.
    #[must_use]
    pub fn failure(id: impl Into<String>, error: RpcErrorBody) -> Self {
        Self { id: id.into(), success: false, result: None, error: Some(error) }
    }
}

/// The error half of a failed response.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcErrorBody {
    /// Stable machine-readable code, e.g. `STATE_CONFLICT`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Optional structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl RpcErrorBody {
    /// Build a body with no details.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into(), details: None }
    }
}

/// A server-initiated event frame delivered to every channel in a room.
///
/// `data` carries the event payload with the envelope fields stripped, so
/// clients never see `meetingId` twice.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Event wire name, e.g. `vote-tally-updated`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Meeting whose room this event belongs to.
    pub meeting_id: String,
    /// RFC 3339 timestamp with millisecond precision.
    pub timestamp: String,
    /// Event-specific payload.
    pub data: Value,
}

impl EventEnvelope {
    /// Wrap a room event for delivery.
    pub fn from_event(event: &RoomEvent) -> serde_json::Result<Self> {
        let mut data = serde_json::to_value(event)?;
        if let Some(map) = data.as_object_mut() {
            let _ = map.remove("type");
            let _ = map.remove("meetingId");
            let _ = map.remove("timestamp");
        }
        Ok(Self {
            event_type: event.event_type().to_string(),
            meeting_id: event.meeting_id().as_str().to_string(),
            timestamp: event.timestamp().to_string(),
            data,
        })
    }
}
