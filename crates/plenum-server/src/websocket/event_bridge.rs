//! Bridges the engine's room event stream onto WebSocket rooms.
//!
//! A single task drains the engine's broadcast channel in order, wraps
//! each event in the wire envelope, and fans it out. Being the only
//! consumer that touches rooms, it preserves the engine's acceptance
//! order end to end.

use std::sync::Arc;

use metrics::counter;
use plenum_core::events::RoomEvent;
use plenum_engine::MeetingEngine;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::metrics::WS_BRIDGE_LAGGED_EVENTS_TOTAL;
use crate::rpc::types::EventEnvelope;
use crate::websocket::broadcast::RoomBroadcaster;

/// Spawn the bridge task. It runs until the engine stream closes or the
/// shutdown token fires.
pub fn spawn_event_bridge(
    engine: Arc<MeetingEngine>,
    broadcaster: Arc<RoomBroadcaster>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let mut events = engine.subscribe_events();
    tokio::spawn(async move {
        info!("room event bridge started");
        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    info!("room event bridge stopping");
                    break;
                }
                received = events.recv() => match received {
                    Ok(event) => forward_event(&broadcaster, &event).await,
                    Err(RecvError::Lagged(missed)) => {
                        counter!(WS_BRIDGE_LAGGED_EVENTS_TOTAL).increment(missed);
                        warn!(missed, "event bridge lagged, room events were skipped");
                    }
                    Err(RecvError::Closed) => {
                        info!("engine event stream closed, bridge exiting");
                        break;
                    }
                }
            }
        }
    })
}

async fn forward_event(broadcaster: &RoomBroadcaster, event: &RoomEvent) {
    let envelope = match EventEnvelope::from_event(event) {
        Ok(envelope) => envelope,
        Err(err) => {
            error!(error = %err, "failed to encode room event, skipping");
            return;
        }
    };
    let flooded = broadcaster
        .broadcast_to_room(&envelope.meeting_id, &envelope)
        .await;
    for connection in flooded {
        if connection.close() {
            warn!(
                connection_id = %connection.id,
                dropped = connection.dropped_count(),
                "evicting connection that cannot keep up"
            );
        }
    }
}
