//! Room membership and event fan-out.
//!
//! One [`RoomBroadcaster`] indexes every live connection and, per meeting,
//! the set of channels subscribed to that meeting's room. An event is
//! serialized once and the resulting frame shared across all deliveries.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::metrics::WS_BROADCAST_DROPS_TOTAL;
use crate::rpc::types::EventEnvelope;
use crate::websocket::connection::ClientConnection;

/// Cumulative drops after which a connection is considered hopeless and
/// handed back for eviction.
pub const MAX_DROPPED_MESSAGES: u64 = 100;

/// Connection and room registry with fan-out.
#[derive(Default)]
pub struct RoomBroadcaster {
    connections: RwLock<HashMap<String, Arc<ClientConnection>>>,
    rooms: RwLock<HashMap<String, HashMap<String, Arc<ClientConnection>>>>,
}

impl RoomBroadcaster {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly accepted connection.
    pub async fn register(&self, connection: Arc<ClientConnection>) {
        let _ = self
            .connections
            .write()
            .await
            .insert(connection.id.clone(), connection);
    }

    /// Remove a connection from the registry and from every room it was
    /// in. Returns the connection if it was still registered.
    pub async fn unregister(&self, connection_id: &str) -> Option<Arc<ClientConnection>> {
        let removed = self.connections.write().await.remove(connection_id)?;
        let mut rooms = self.rooms.write().await;
        for meeting_id in removed.rooms() {
            if let Some(room) = rooms.get_mut(&meeting_id) {
                let _ = room.remove(connection_id);
                if room.is_empty() {
                    let _ = rooms.remove(&meeting_id);
                }
            }
        }
        Some(removed)
    }

    /// Add a connection's channel to a meeting's room.
    pub async fn join_room(&self, meeting_id: &str, connection: &Arc<ClientConnection>) {
        let _ = connection.track_room(meeting_id);
        let mut rooms = self.rooms.write().await;
        let _ = rooms
            .entry(meeting_id.to_string())
            .or_default()
            .insert(connection.id.clone(), Arc::clone(connection));
        debug!(
            meeting_id,
            connection_id = %connection.id,
            room_size = rooms.get(meeting_id).map_or(0, HashMap::len),
            "channel joined room"
        );
    }

    /// Remove a connection's channel from a meeting's room.
    pub async fn leave_room(&self, meeting_id: &str, connection: &ClientConnection) {
        let _ = connection.untrack_room(meeting_id);
        let mut rooms = self.rooms.write().await;
        if let Some(room) = rooms.get_mut(meeting_id) {
            let _ = room.remove(&connection.id);
            if room.is_empty() {
                let _ = rooms.remove(meeting_id);
            }
        }
    }

    /// Deliver an event to every channel in its meeting's room.
    ///
    /// Returns the connections whose cumulative drop count crossed
    /// [`MAX_DROPPED_MESSAGES`] during this broadcast; the caller decides
    /// their fate.
    pub async fn broadcast_to_room(
        &self,
        meeting_id: &str,
        envelope: &EventEnvelope,
    ) -> Vec<Arc<ClientConnection>> {
        let frame = match serde_json::to_string(envelope) {
            Ok(json) => Arc::new(json),
            Err(err) => {
                error!(meeting_id, error = %err, "failed to encode room event");
                return Vec::new();
            }
        };

        let targets: Vec<Arc<ClientConnection>> = {
            let rooms = self.rooms.read().await;
            rooms
                .get(meeting_id)
                .map(|room| room.values().cloned().collect())
                .unwrap_or_default()
        };

        let mut flooded = Vec::new();
        for connection in targets {
            if connection.is_closed() {
                continue;
            }
            if !connection.send(Arc::clone(&frame)) {
                counter!(WS_BROADCAST_DROPS_TOTAL).increment(1);
                if connection.dropped_count() >= MAX_DROPPED_MESSAGES {
                    flooded.push(connection);
                }
            }
        }
        flooded
    }

    /// How many channels a participant holds in a room.
    pub async fn participant_channels(&self, meeting_id: &str, participant_id: &str) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(meeting_id).map_or(0, |room| {
            room.values()
                .filter(|connection| {
                    connection.participant_id().as_deref() == Some(participant_id)
                })
                .count()
        })
    }

    /// Channels currently in a room.
    pub async fn room_size(&self, meeting_id: &str) -> usize {
        self.rooms
            .read()
            .await
            .get(meeting_id)
            .map_or(0, HashMap::len)
    }

    /// Rooms with at least one channel.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Live connections, in rooms or not.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
