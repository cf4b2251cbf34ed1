//! WebSocket transport: per-connection state, room fan-out, and the
//! session loop that ties frames to the RPC registry.

pub mod broadcast;
pub mod connection;
pub mod event_bridge;
pub mod handler;
pub mod session;
