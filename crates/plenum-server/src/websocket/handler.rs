//! Turns one inbound text frame into one outbound response frame.

use tracing::debug;

use crate::rpc::context::RpcContext;
use crate::rpc::errors::INVALID_PARAMS;
use crate::rpc::registry::RpcRegistry;
use crate::rpc::types::{RpcErrorBody, RpcRequest, RpcResponse};

/// Emitted if a response itself refuses to serialize.
const ENCODE_FAILURE_FRAME: &str = r#"{"id":"unknown","success":false,"error":{"code":"INTERNAL_ERROR","message":"failed to encode response"}}"#;

/// The outcome of processing one frame.
///
/// The gateway inspects `method` and `response` after dispatch to apply
/// connection-level effects (room membership, participant binding).
pub struct HandleResult {
    /// The serialized response frame to send back.
    pub response_json: String,
    /// The dispatched method, empty if the frame never parsed.
    pub method: String,
    /// The structured response.
    pub response: RpcResponse,
}

/// Parse, dispatch, and encode. Never fails: malformed input becomes an
/// error response with id `"unknown"` and the connection stays open.
pub async fn handle_message(
    message: &str,
    registry: &RpcRegistry,
    ctx: &RpcContext,
) -> HandleResult {
    let request: RpcRequest = match serde_json::from_str(message) {
        Ok(request) => request,
        Err(err) => {
            debug!(error = %err, "discarding malformed rpc frame");
            let response = RpcResponse::failure(
                "unknown",
                RpcErrorBody::new(
                    INVALID_PARAMS,
                    "frame must be a JSON object with id, method, and params",
                ),
            );
            return HandleResult {
                response_json: encode(&response),
                method: String::new(),
                response,
            };
        }
    };

    let response = match registry.dispatch(&request.method, request.params, ctx).await {
        Ok(result) => RpcResponse::success(&request.id, result),
        Err(err) => RpcResponse::failure(&request.id, err.to_error_body()),
    };

    HandleResult {
        response_json: encode(&response),
        method: request.method,
        response,
    }
}

fn encode(response: &RpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| ENCODE_FAILURE_FRAME.to_string())
}
