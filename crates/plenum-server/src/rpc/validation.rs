//! Parameter validation shared by all method handlers.

use crate::rpc::errors::RpcError;

/// Upper bound on any single string parameter, in bytes.
pub const MAX_PARAM_LENGTH: usize = 8192;

/// Reject empty or oversized required string parameters.
pub fn validate_string_param(value: &str, name: &str) -> Result<(), RpcError> {
    if value.trim().is_empty() {
        return Err(RpcError::invalid_params(format!("'{name}' must not be empty")));
    }
    validate_param_length(value, name)
}

/// Reject oversized parameters. Empty is fine here.
pub fn validate_param_length(value: &str, name: &str) -> Result<(), RpcError> {
    if value.len() > MAX_PARAM_LENGTH {
        return Err(RpcError::invalid_params(format!(
            "'{name}' exceeds the maximum length of {MAX_PARAM_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// Require a parseable RFC 3339 timestamp, offset included.
pub fn validate_rfc3339(value: &str, name: &str) -> Result<(), RpcError> {
    if chrono::DateTime::parse_from_rfc3339(value).is_err() {
        return Err(RpcError::invalid_params(format!(
            "'{name}' must be an RFC 3339 timestamp"
        )));
    }
    Ok(())
}
