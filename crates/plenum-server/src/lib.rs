//! # plenum-server
//!
//! WebSocket RPC gateway and HTTP surface for the meeting system.
//!
//! Clients hold one WebSocket connection to `/ws` and speak a small
//! request/response envelope; every operation is a named method dispatched
//! through the [`rpc::registry::RpcRegistry`]. Room events flow the other
//! way: the engine's broadcast stream feeds the
//! [`websocket::event_bridge`], which fans each event out to the
//! subscribed connections of that meeting's room through bounded
//! per-connection queues.
//!
//! - **[`rpc`]**: wire types, stable error codes, validation, the registry
//!   with its dispatch timeout, and a handler per method
//! - **[`websocket`]**: connection state, room membership, fan-out with
//!   slow-client eviction, heartbeats, and the session loop
//! - **[`server`]**: Axum router (`/ws`, `/health`, `/metrics`) and the
//!   listener
//! - **[`shutdown`]**: the cancellation token every background task watches
//! - **[`metrics`]**: Prometheus recorder setup and metric names

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod metrics;
pub mod rpc;
pub mod server;
pub mod shutdown;
pub mod websocket;

#[cfg(test)]
mod testing;

pub use config::ServerConfig;
pub use server::{AppState, PlenumServer, app_router};
pub use shutdown::ShutdownHandle;
