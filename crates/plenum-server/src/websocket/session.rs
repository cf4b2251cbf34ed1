//! WebSocket session lifecycle.
//!
//! One task pair per socket: an outbound pump that drains the connection's
//! send queue and drives heartbeats, and the inbound loop that dispatches
//! frames. Room membership changes happen here, after a successful
//! `room.subscribe` or `room.unsubscribe` dispatch, because only the
//! gateway knows which connection carried the request.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::metrics::{
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL,
    WS_DISCONNECTIONS_TOTAL,
};
use crate::server::AppState;
use crate::websocket::connection::{ClientConnection, SEND_QUEUE_CAPACITY};
use crate::websocket::handler::{HandleResult, handle_message};

/// Drive one WebSocket connection to completion.
pub async fn run_ws_session(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::now_v7().to_string();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(SEND_QUEUE_CAPACITY);
    let connection = Arc::new(ClientConnection::new(connection_id.clone(), send_tx));

    state.broadcaster.register(Arc::clone(&connection)).await;
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
    info!(connection_id, "websocket connected");

    let heartbeat_interval = state.config.heartbeat_interval;
    let heartbeat_timeout = state.config.heartbeat_timeout;
    let pump_connection = Arc::clone(&connection);
    let mut pump = tokio::spawn(async move {
        let mut ping = tokio::time::interval(heartbeat_interval);
        loop {
            tokio::select! {
                frame = send_rx.recv() => match frame {
                    Some(text) => {
                        if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                _ = ping.tick() => {
                    if pump_connection.is_closed() {
                        break;
                    }
                    if !pump_connection.check_alive()
                        && pump_connection.last_pong_elapsed() > heartbeat_timeout
                    {
                        warn!(
                            connection_id = %pump_connection.id,
                            "heartbeat timed out, closing connection"
                        );
                        break;
                    }
                    if ws_tx.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut pump => break,
            frame = ws_rx.next() => {
                let message = match frame {
                    Some(Ok(message)) => message,
                    Some(Err(err)) => {
                        debug!(connection_id, error = %err, "websocket read failed");
                        break;
                    }
                    None => break,
                };
                match message {
                    Message::Text(text) => {
                        process_frame(text.as_str(), &state, &connection).await;
                    }
                    Message::Binary(data) => match std::str::from_utf8(&data) {
                        Ok(text) => process_frame(text, &state, &connection).await,
                        Err(_) => debug!(connection_id, "ignoring non-utf8 binary frame"),
                    },
                    Message::Ping(_) | Message::Pong(_) => connection.mark_alive(),
                    Message::Close(_) => {
                        debug!(connection_id, "client closed the connection");
                        break;
                    }
                }
            }
        }
    }

    pump.abort();
    detach_connection(&state, &connection).await;
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(connection.age().as_secs_f64());
    info!(connection_id, "websocket disconnected");
}

async fn process_frame(text: &str, state: &AppState, connection: &Arc<ClientConnection>) {
    let result = handle_message(text, &state.registry, &state.ctx).await;
    apply_room_transitions(&result, state, connection).await;
    let _ = connection.send(Arc::new(result.response_json));
}

/// Apply the connection-level effects of a successful room method.
async fn apply_room_transitions(
    result: &HandleResult,
    state: &AppState,
    connection: &Arc<ClientConnection>,
) {
    if !result.response.success || connection.is_closed() {
        return;
    }
    match result.method.as_str() {
        "room.subscribe" => {
            if let Some((meeting_id, participant_id)) = result_ids(result) {
                connection.bind_participant(&participant_id);
                state.broadcaster.join_room(&meeting_id, connection).await;
                info!(
                    connection_id = %connection.id,
                    meeting_id,
                    participant_id,
                    "connection subscribed to room"
                );
            }
        }
        "room.unsubscribe" => {
            if let Some((meeting_id, participant_id)) = result_ids(result) {
                state.broadcaster.leave_room(&meeting_id, connection).await;
                leave_if_last_channel(state, &meeting_id, &participant_id).await;
            }
        }
        _ => {}
    }
}

/// Pull the meeting and participant ids out of a room method result.
fn result_ids(result: &HandleResult) -> Option<(String, String)> {
    let value = result.response.result.as_ref()?;
    let meeting_id = value.get("meetingId")?.as_str()?;
    let participant_id = value.get("participantId")?.as_str()?;
    Some((meeting_id.to_string(), participant_id.to_string()))
}

/// Close attendance once a participant's last channel in a room is gone.
async fn leave_if_last_channel(state: &AppState, meeting_id: &str, participant_id: &str) {
    if state
        .broadcaster
        .participant_channels(meeting_id, participant_id)
        .await
        > 0
    {
        return;
    }
    match state.ctx.engine.leave_meeting(meeting_id, participant_id).await {
        Ok(remaining) => {
            debug!(meeting_id, participant_id, remaining, "participant left meeting");
        }
        Err(err) => {
            debug!(
                meeting_id,
                participant_id,
                error = %err,
                "attendance leave failed after channel removal"
            );
        }
    }
}

/// Remove a connection from the registry and every room, closing
/// attendance where it held the participant's last channel.
async fn detach_connection(state: &AppState, connection: &Arc<ClientConnection>) {
    let _ = state.broadcaster.unregister(&connection.id).await;
    let participant_id = connection.participant_id();
    for meeting_id in connection.take_rooms() {
        if let Some(participant_id) = &participant_id {
            leave_if_last_channel(state, &meeting_id, participant_id).await;
        }
    }
}
