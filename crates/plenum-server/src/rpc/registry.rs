//! Method registry and dispatch.
//!
//! Every RPC method registers a handler here. Dispatch wraps the call with
//! a timeout, per-method metrics, and a slow-call warning.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use serde_json::Value;
use tracing::warn;

use crate::metrics::{RPC_ERRORS_TOTAL, RPC_REQUESTS_TOTAL, RPC_REQUEST_DURATION_SECONDS};
use crate::rpc::context::RpcContext;
use crate::rpc::errors::{INTERNAL_ERROR, METHOD_NOT_FOUND, RpcError};

/// Latency above which a finished call is logged as slow.
const SLOW_CALL_THRESHOLD: Duration = Duration::from_secs(5);

/// A single RPC method implementation.
#[async_trait]
pub trait RpcMethod: Send + Sync {
    /// Handle one request. `params` arrives exactly as the client sent it.
    async fn invoke(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError>;
}

/// Maps method names to handlers.
#[derive(Default)]
pub struct RpcRegistry {
    handlers: HashMap<String, Arc<dyn RpcMethod>>,
}

impl RpcRegistry {
    /// Hard ceiling on a single handler invocation.
    pub const CALL_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under a method name. Replaces any previous one.
    pub fn register(&mut self, method: impl Into<String>, handler: impl RpcMethod + 'static) {
        let _ = self.handlers.insert(method.into(), Arc::new(handler));
    }

    /// Whether a method is registered.
    #[must_use]
    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// All registered method names, sorted.
    #[must_use]
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Dispatch a request to its handler.
    pub async fn dispatch(
        &self,
        method: &str,
        params: Option<Value>,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        counter!(RPC_REQUESTS_TOTAL, "method" => method.to_string()).increment(1);

        let Some(handler) = self.handlers.get(method) else {
            counter!(RPC_ERRORS_TOTAL, "method" => method.to_string(), "code" => METHOD_NOT_FOUND)
                .increment(1);
            return Err(RpcError::NotFound {
                code: METHOD_NOT_FOUND,
                message: format!("unknown method '{method}'"),
            });
        };

        let started = Instant::now();
        let outcome = tokio::time::timeout(Self::CALL_TIMEOUT, handler.invoke(params, ctx)).await;
        let elapsed = started.elapsed();
        histogram!(RPC_REQUEST_DURATION_SECONDS, "method" => method.to_string())
            .record(elapsed.as_secs_f64());
        if elapsed >= SLOW_CALL_THRESHOLD {
            let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            warn!(method, elapsed_ms, "slow rpc call");
        }

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                counter!(RPC_ERRORS_TOTAL, "method" => method.to_string(), "code" => err.code())
                    .increment(1);
                Err(err)
            }
            Err(_) => {
                counter!(RPC_ERRORS_TOTAL, "method" => method.to_string(), "code" => INTERNAL_ERROR)
                    .increment(1);
                warn!(method, "rpc call exceeded the handler timeout");
                Err(RpcError::Internal {
                    message: "the request timed out".to_string(),
                })
            }
        }
    }
}
