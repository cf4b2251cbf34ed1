//! Per-connection state shared between the gateway tasks and the
//! broadcaster.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

/// Outbound frames buffered per connection before drops begin.
pub const SEND_QUEUE_CAPACITY: usize = 256;

/// One WebSocket connection.
///
/// `send` never blocks: a full queue drops the frame and counts it, so one
/// slow consumer cannot stall a room. The queue's receiving half lives in
/// the connection's outbound pump task.
pub struct ClientConnection {
    /// Unique connection id.
    pub id: String,
    /// When the socket was accepted.
    pub connected_at: Instant,
    participant_id: Mutex<Option<String>>,
    rooms: Mutex<BTreeSet<String>>,
    tx: mpsc::Sender<Arc<String>>,
    is_alive: AtomicBool,
    closed: AtomicBool,
    last_pong: Mutex<Instant>,
    dropped_messages: AtomicU64,
}

impl ClientConnection {
    /// Wrap a freshly accepted socket's send queue.
    #[must_use]
    pub fn new(id: String, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id,
            connected_at: Instant::now(),
            participant_id: Mutex::new(None),
            rooms: Mutex::new(BTreeSet::new()),
            tx,
            is_alive: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            last_pong: Mutex::new(Instant::now()),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Record which participant this connection acts as.
    pub fn bind_participant(&self, participant_id: &str) {
        *self.participant_id.lock() = Some(participant_id.to_string());
    }

    /// The bound participant, if any.
    #[must_use]
    pub fn participant_id(&self) -> Option<String> {
        self.participant_id.lock().clone()
    }

    /// Remember that this connection holds a channel in a room.
    pub fn track_room(&self, meeting_id: &str) -> bool {
        self.rooms.lock().insert(meeting_id.to_string())
    }

    /// Forget a room.
    pub fn untrack_room(&self, meeting_id: &str) -> bool {
        self.rooms.lock().remove(meeting_id)
    }

    /// Rooms this connection currently holds a channel in.
    #[must_use]
    pub fn rooms(&self) -> Vec<String> {
        self.rooms.lock().iter().cloned().collect()
    }

    /// Drain the tracked rooms. A second call returns nothing, which is
    /// what makes teardown safe to run twice.
    #[must_use]
    pub fn take_rooms(&self) -> Vec<String> {
        std::mem::take(&mut *self.rooms.lock()).into_iter().collect()
    }

    /// Queue a frame for delivery. Returns false if it was dropped.
    pub fn send(&self, message: Arc<String>) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.dropped_messages.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(connection_id = %self.id, dropped, "send queue full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Frames dropped so far.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Mark the connection for closure. Returns true the first time.
    pub fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::SeqCst)
    }

    /// Whether closure has been requested.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Record liveness from any inbound traffic.
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::SeqCst);
        *self.last_pong.lock() = Instant::now();
    }

    /// Consume the liveness flag: returns whether anything arrived since
    /// the previous check, and arms the next interval.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::SeqCst)
    }

    /// Time since the last inbound sign of life.
    #[must_use]
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// How long the connection has been open.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;

    fn connection_with_capacity(capacity: usize) -> (ClientConnection, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (ClientConnection::new("conn_1".into(), tx), rx)
    }

    #[test]
    fn send_drops_when_the_queue_is_full() {
        let (connection, _rx) = connection_with_capacity(2);
        assert!(connection.send(Arc::new("a".into())));
        assert!(connection.send(Arc::new("b".into())));
        assert!(!connection.send(Arc::new("c".into())));
        assert_eq!(connection.dropped_count(), 1);
    }

    #[test]
    fn send_fails_once_the_receiver_is_gone() {
        let (connection, rx) = connection_with_capacity(2);
        drop(rx);
        assert!(!connection.send(Arc::new("a".into())));
        // Closed is not a drop: nothing will ever read this queue again.
        assert_eq!(connection.dropped_count(), 0);
    }

    #[test]
    fn room_tracking_is_a_set() {
        let (connection, _rx) = connection_with_capacity(1);
        assert!(connection.track_room("mtg_1"));
        assert!(!connection.track_room("mtg_1"));
        assert!(connection.track_room("mtg_2"));
        assert_eq!(connection.rooms().len(), 2);

        assert!(connection.untrack_room("mtg_1"));
        assert_eq!(connection.rooms(), vec!["mtg_2".to_string()]);

        assert_eq!(connection.take_rooms(), vec!["mtg_2".to_string()]);
        assert!(connection.take_rooms().is_empty());
    }

    #[test]
    fn check_alive_consumes_the_flag() {
        let (connection, _rx) = connection_with_capacity(1);
        assert!(connection.check_alive());
        assert!(!connection.check_alive());
        connection.mark_alive();
        assert!(connection.check_alive());
    }

    #[test]
    fn close_reports_only_the_first_request() {
        let (connection, _rx) = connection_with_capacity(1);
        assert!(!connection.is_closed());
        assert!(connection.close());
        assert!(!connection.close());
        assert!(connection.is_closed());
    }

    #[test]
    fn participant_binding_is_readable() {
        let (connection, _rx) = connection_with_capacity(1);
        assert!(connection.participant_id().is_none());
        connection.bind_participant("alice");
        assert_eq!(connection.participant_id().as_deref(), Some("alice"));
    }
}
