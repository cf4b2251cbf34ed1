//! End-to-end tests using a real WebSocket client.
//!
//! Each test boots a full server on an ephemeral port: in-memory store,
//! static roster (three founders, one plain member), stubbed minutes
//! collaborators, and the event bridge. Assertions run against the wire,
//! not the internals.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

use plenum_core::types::Role;
use plenum_engine::{EngineConfig, MeetingEngine, Profile, StaticDirectory};
use plenum_minutes::{
    DocumentRenderer, MeetingSummary, MinutesGenerator, RenderRequest, RenderedDocument,
};
use plenum_server::config::ServerConfig;
use plenum_server::rpc::context::RpcContext;
use plenum_server::rpc::registry::RpcRegistry;
use plenum_server::server::PlenumServer;
use plenum_server::websocket::event_bridge::spawn_event_bridge;
use plenum_store::{MeetingStore, memory_pool, run_migrations};

const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

struct StubGenerator;

#[async_trait]
impl MinutesGenerator for StubGenerator {
    async fn generate(&self, summary: &MeetingSummary) -> plenum_minutes::Result<String> {
        Ok(format!("Minutes for {}", summary.title))
    }
}

struct StubRenderer;

#[async_trait]
impl DocumentRenderer for StubRenderer {
    async fn render(&self, request: &RenderRequest) -> plenum_minutes::Result<RenderedDocument> {
        Ok(RenderedDocument {
            url: format!("https://docs.test/{}", request.filename),
        })
    }
}

/// Stand up a server on an ephemeral port. Returns the WS URL plus the
/// server handle so tests can drive shutdown.
async fn start_server_with(config: ServerConfig) -> (String, Arc<PlenumServer>) {
    let pool = memory_pool().unwrap();
    {
        let conn = pool.get().unwrap();
        let _ = run_migrations(&conn).unwrap();
    }
    let store = Arc::new(MeetingStore::new(pool));

    let roster = [
        ("alice", "Alice", Role::Founder),
        ("bob", "Bob", Role::Founder),
        ("carol", "Carol", Role::Founder),
        ("dave", "Dave", Role::Member),
    ];
    let directory = Arc::new(StaticDirectory::from_entries(roster.into_iter().map(
        |(id, name, role)| {
            (
                id.to_string(),
                Profile {
                    display_name: name.to_string(),
                    role,
                },
            )
        },
    )));

    let engine = Arc::new(MeetingEngine::new(
        store,
        directory.clone(),
        Arc::new(StubGenerator),
        Arc::new(StubRenderer),
        EngineConfig::default(),
    ));

    let mut registry = RpcRegistry::new();
    plenum_server::rpc::handlers::register_all(&mut registry);

    let metrics = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    let server = Arc::new(PlenumServer::new(
        config,
        registry,
        RpcContext::new(engine.clone(), directory),
        metrics,
    ));

    drop(spawn_event_bridge(
        engine,
        server.broadcaster().clone(),
        server.shutdown().signal(),
    ));

    let (addr, _handle) = server.listen().await.unwrap();
    (format!("ws://{addr}/ws"), server)
}

async fn start_server() -> (String, Arc<PlenumServer>) {
    start_server_with(ServerConfig::default()).await
}

/// Open a WebSocket client. The server sends nothing until asked.
async fn open_ws(url: &str) -> WsStream {
    let (ws, _) = connect_async(url).await.expect("websocket upgrade failed");
    ws
}

/// Read the next text frame as JSON, skipping pings and pongs.
async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let frame = timeout(FRAME_TIMEOUT, ws.next())
            .await
            .expect("no frame before timeout")
            .expect("stream closed")
            .expect("ws error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).expect("frame is not JSON");
        }
    }
}

/// Send an RPC request and read the matching response, skipping any
/// room events that arrive in between.
async fn rpc(ws: &mut WsStream, id: u64, method: &str, params: Option<Value>) -> Value {
    let request_id = format!("r{id}");
    let mut frame = json!({"id": request_id, "method": method});
    if let Some(params) = params {
        frame["params"] = params;
    }
    ws.send(Message::text(frame.to_string())).await.unwrap();

    loop {
        let reply = next_json(ws).await;
        if reply.get("id").and_then(Value::as_str) == Some(request_id.as_str()) {
            return reply;
        }
    }
}

/// Read the next text frame as JSON; `None` once the stream ends or the
/// clock runs out.
async fn try_next_json(ws: &mut WsStream, dur: Duration) -> Option<Value> {
    let next_text = async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str::<Value>(&text).ok();
                }
                Some(Ok(_)) => {}
                _ => return None,
            }
        }
    };
    timeout(dur, next_text).await.ok().flatten()
}

/// Read frames until an event of the given type arrives.
async fn read_until_event_type(ws: &mut WsStream, event_type: &str) -> Option<Value> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return None;
        }
        let frame = try_next_json(ws, remaining).await?;
        if frame.get("type").and_then(Value::as_str) == Some(event_type) {
            return Some(frame);
        }
    }
}

/// Create a planned meeting as alice, returning its id.
async fn create_meeting(ws: &mut WsStream, title: &str) -> String {
    let reply = rpc(
        ws,
        9001,
        "meeting.create",
        Some(json!({
            "title": title,
            "scheduledFor": "2026-09-01T10:00:00Z",
            "creatorId": "alice",
        })),
    )
    .await;
    assert_eq!(reply["success"], true, "meeting.create failed: {reply}");
    reply["result"]["meeting"]["id"].as_str().unwrap().to_string()
}

/// Create and activate a meeting, returning its id.
async fn activate_meeting(ws: &mut WsStream, title: &str) -> String {
    let meeting_id = create_meeting(ws, title).await;
    let reply = rpc(
        ws,
        9002,
        "meeting.activate",
        Some(json!({"meetingId": meeting_id, "actorId": "alice"})),
    )
    .await;
    assert_eq!(reply["success"], true, "meeting.activate failed: {reply}");
    meeting_id
}

/// Add a voting-enabled agenda item, returning its id.
async fn voting_item(ws: &mut WsStream, meeting_id: &str) -> String {
    let reply = rpc(
        ws,
        9003,
        "agenda.add",
        Some(json!({
            "meetingId": meeting_id,
            "actorId": "alice",
            "title": "Budget approval",
            "requiresVoting": true,
        })),
    )
    .await;
    assert_eq!(reply["success"], true, "agenda.add failed: {reply}");
    reply["result"]["agendaItem"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_ping_round_trip() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let reply = rpc(&mut ws, 1, "system.ping", None).await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["status"], "ok");
    assert!(reply["result"]["uptimeSecs"].is_u64());

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_meeting_lifecycle() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    // Create
    let reply = rpc(
        &mut ws,
        1,
        "meeting.create",
        Some(json!({
            "title": "Q3 review",
            "description": "Numbers and next steps",
            "scheduledFor": "2026-09-01T10:00:00Z",
            "creatorId": "alice",
        })),
    )
    .await;
    assert_eq!(reply["success"], true);
    let mid = reply["result"]["meeting"]["id"].as_str().unwrap().to_string();
    assert_eq!(reply["result"]["meeting"]["status"], "planned");

    // Get
    let reply = rpc(&mut ws, 2, "meeting.get", Some(json!({"meetingId": mid}))).await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["meeting"]["title"], "Q3 review");

    // List
    let reply = rpc(&mut ws, 3, "meeting.list", None).await;
    assert_eq!(reply["success"], true);
    let meetings = reply["result"]["meetings"].as_array().unwrap();
    assert!(meetings.iter().any(|m| m["id"] == mid.as_str()));

    // Update while planned
    let reply = rpc(
        &mut ws,
        4,
        "meeting.update",
        Some(json!({"meetingId": mid, "actorId": "alice", "title": "Q3 deep dive"})),
    )
    .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["meeting"]["title"], "Q3 deep dive");

    // Activate
    let reply = rpc(
        &mut ws,
        5,
        "meeting.activate",
        Some(json!({"meetingId": mid, "actorId": "alice"})),
    )
    .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["meeting"]["status"], "active");

    // Complete; the stub collaborators produce a protocol URL
    let reply = rpc(
        &mut ws,
        6,
        "meeting.complete",
        Some(json!({"meetingId": mid, "actorId": "alice"})),
    )
    .await;
    assert_eq!(reply["success"], true, "meeting.complete failed: {reply}");
    assert_eq!(reply["result"]["meeting"]["status"], "completed");
    let protocol_url = reply["result"]["meeting"]["protocolUrl"].as_str().unwrap();
    assert!(protocol_url.starts_with("https://docs.test/"));

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_meeting_cancel() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let mid = create_meeting(&mut ws, "Doomed meeting").await;
    let reply = rpc(
        &mut ws,
        1,
        "meeting.cancel",
        Some(json!({"meetingId": mid, "actorId": "bob"})),
    )
    .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["meeting"]["status"], "cancelled");

    // Cancelled is terminal
    let reply = rpc(
        &mut ws,
        2,
        "meeting.activate",
        Some(json!({"meetingId": mid, "actorId": "alice"})),
    )
    .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error"]["code"], "STATE_CONFLICT");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_agenda_round_trip() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let mid = create_meeting(&mut ws, "Planning").await;

    let reply = rpc(
        &mut ws,
        1,
        "agenda.add",
        Some(json!({
            "meetingId": mid,
            "actorId": "alice",
            "title": "Hiring plan",
            "requiresVoting": false,
        })),
    )
    .await;
    assert_eq!(reply["success"], true);
    let first_id = reply["result"]["agendaItem"]["id"].as_str().unwrap().to_string();
    assert_eq!(reply["result"]["agendaItem"]["position"], 1);

    let reply = rpc(
        &mut ws,
        2,
        "agenda.add",
        Some(json!({
            "meetingId": mid,
            "actorId": "bob",
            "title": "Office lease",
            "requiresVoting": true,
        })),
    )
    .await;
    assert_eq!(reply["result"]["agendaItem"]["position"], 2);

    let reply = rpc(&mut ws, 3, "agenda.list", Some(json!({"meetingId": mid}))).await;
    let items = reply["result"]["agendaItems"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "Hiring plan");
    assert_eq!(items[1]["title"], "Office lease");

    let reply = rpc(
        &mut ws,
        4,
        "agenda.remove",
        Some(json!({"agendaItemId": first_id, "actorId": "alice"})),
    )
    .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["removed"], true);

    let reply = rpc(&mut ws, 5, "agenda.list", Some(json!({"meetingId": mid}))).await;
    let items = reply["result"]["agendaItems"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Office lease");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_vote_cast_and_recast() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let mid = activate_meeting(&mut ws, "Budget session").await;
    let item_id = voting_item(&mut ws, &mid).await;

    let reply = rpc(
        &mut ws,
        1,
        "vote.cast",
        Some(json!({"agendaItemId": item_id, "voterId": "alice", "value": "yes"})),
    )
    .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["tally"]["yes"], 1);
    assert_eq!(reply["result"]["outcome"], "Approved");
    let vote_id = reply["result"]["vote"]["id"].as_str().unwrap().to_string();

    // Re-casting replaces the ballot instead of stacking a second one
    let reply = rpc(
        &mut ws,
        2,
        "vote.cast",
        Some(json!({
            "agendaItemId": item_id,
            "voterId": "alice",
            "value": "no",
            "comment": "Changed my mind",
        })),
    )
    .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["vote"]["id"], vote_id.as_str());
    assert_eq!(reply["result"]["tally"]["yes"], 0);
    assert_eq!(reply["result"]["tally"]["no"], 1);
    assert_eq!(reply["result"]["outcome"], "Rejected");

    let reply = rpc(
        &mut ws,
        3,
        "vote.tally",
        Some(json!({"agendaItemId": item_id})),
    )
    .await;
    assert_eq!(reply["result"]["tally"]["no"], 1);
    assert_eq!(reply["result"]["outcome"], "Rejected");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_subscribe_acknowledges_attendance() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let mid = activate_meeting(&mut ws, "Standup").await;
    let reply = rpc(
        &mut ws,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "alice"})),
    )
    .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["meetingId"], mid.as_str());
    assert_eq!(reply["result"]["participantId"], "alice");
    assert_eq!(reply["result"]["newlyJoined"], true);
    assert_eq!(reply["result"]["attendeeCount"], 1);
    assert!(reply["result"]["attendance"]["joinedAt"].is_string());

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_second_channel_joins_idempotently() {
    let (url, server) = start_server().await;
    let mut ws1 = open_ws(&url).await;
    let mut ws2 = open_ws(&url).await;

    let mid = activate_meeting(&mut ws1, "Two screens").await;
    let reply = rpc(
        &mut ws1,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "alice"})),
    )
    .await;
    assert_eq!(reply["result"]["newlyJoined"], true);

    // Same participant on a second connection: one attendance record
    let reply = rpc(
        &mut ws2,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "alice"})),
    )
    .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["newlyJoined"], false);
    assert_eq!(reply["result"]["attendeeCount"], 1);

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_join_event_reaches_the_room() {
    let (url, server) = start_server().await;
    let mut ws1 = open_ws(&url).await;
    let mut ws2 = open_ws(&url).await;

    let mid = activate_meeting(&mut ws1, "All hands").await;
    let reply = rpc(
        &mut ws1,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "alice"})),
    )
    .await;
    assert_eq!(reply["success"], true);

    let reply = rpc(
        &mut ws2,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "bob"})),
    )
    .await;
    assert_eq!(reply["success"], true);

    // Alice's channel sees bob arrive, wrapped in the event envelope.
    // Her own join can race the room attach, so skip it if it shows up.
    let evt = loop {
        let evt = read_until_event_type(&mut ws1, "participant-joined")
            .await
            .expect("no participant-joined event arrived");
        if evt["data"]["participantId"] == "bob" {
            break evt;
        }
    };
    assert_eq!(evt["meetingId"], mid.as_str());
    assert!(evt["timestamp"].is_string());
    assert_eq!(evt["data"]["participantId"], "bob");
    assert_eq!(evt["data"]["displayName"], "Bob");
    assert_eq!(evt["data"]["attendeeCount"], 2);

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_vote_event_fans_out_to_every_channel() {
    let (url, server) = start_server().await;
    let mut ws1 = open_ws(&url).await;
    let mut ws2 = open_ws(&url).await;

    let mid = activate_meeting(&mut ws1, "Funding round").await;
    let item_id = voting_item(&mut ws1, &mid).await;

    let _ = rpc(
        &mut ws1,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "alice"})),
    )
    .await;
    let _ = rpc(
        &mut ws2,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "bob"})),
    )
    .await;

    let reply = rpc(
        &mut ws2,
        2,
        "vote.cast",
        Some(json!({"agendaItemId": item_id, "voterId": "bob", "value": "yes"})),
    )
    .await;
    assert_eq!(reply["success"], true);

    // Both channels get the refreshed tally, the caster included
    for ws in [&mut ws1, &mut ws2] {
        let evt = read_until_event_type(ws, "vote-tally-updated")
            .await
            .expect("no vote-tally-updated event arrived");
        assert_eq!(evt["meetingId"], mid.as_str());
        assert_eq!(evt["data"]["agendaItemId"], item_id.as_str());
        assert_eq!(evt["data"]["tally"]["yes"], 1);
        assert_eq!(evt["data"]["outcome"], "Approved");
    }

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_chat_echoes_to_the_sender() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let mid = activate_meeting(&mut ws, "Watercooler").await;
    let _ = rpc(
        &mut ws,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "alice"})),
    )
    .await;

    let reply = rpc(
        &mut ws,
        2,
        "chat.send",
        Some(json!({"meetingId": mid, "senderId": "alice", "content": "Shall we start?"})),
    )
    .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["message"]["content"], "Shall we start?");

    let evt = read_until_event_type(&mut ws, "chat-message")
        .await
        .expect("no chat-message event arrived");
    assert_eq!(evt["data"]["senderId"], "alice");
    assert_eq!(evt["data"]["senderName"], "Alice");
    assert_eq!(evt["data"]["content"], "Shall we start?");

    let reply = rpc(&mut ws, 3, "chat.history", Some(json!({"meetingId": mid}))).await;
    let messages = reply["result"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "Shall we start?");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_events_stay_in_their_room() {
    let (url, server) = start_server().await;
    let mut ws1 = open_ws(&url).await;
    let mut ws2 = open_ws(&url).await;

    let mid_a = activate_meeting(&mut ws1, "Meeting A").await;
    let mid_b = activate_meeting(&mut ws1, "Meeting B").await;

    let _ = rpc(
        &mut ws1,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid_a, "participantId": "alice"})),
    )
    .await;
    let _ = rpc(
        &mut ws2,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid_b, "participantId": "bob"})),
    )
    .await;

    let reply = rpc(
        &mut ws2,
        2,
        "chat.send",
        Some(json!({"meetingId": mid_b, "senderId": "bob", "content": "B only"})),
    )
    .await;
    assert_eq!(reply["success"], true);

    // ws2 gets the echo; ws1, subscribed to a different room, stays silent
    let evt = read_until_event_type(&mut ws2, "chat-message").await.unwrap();
    assert_eq!(evt["meetingId"], mid_b.as_str());
    assert!(
        read_until_event_type(&mut ws1, "chat-message").await.is_none(),
        "chat event crossed rooms"
    );

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_unsubscribe_stops_event_delivery() {
    let (url, server) = start_server().await;
    let mut ws1 = open_ws(&url).await;
    let mut ws2 = open_ws(&url).await;

    let mid = activate_meeting(&mut ws1, "Quiet exit").await;
    let _ = rpc(
        &mut ws1,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "alice"})),
    )
    .await;
    let _ = rpc(
        &mut ws2,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "bob"})),
    )
    .await;

    let reply = rpc(
        &mut ws1,
        2,
        "room.unsubscribe",
        Some(json!({"meetingId": mid, "participantId": "alice"})),
    )
    .await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["unsubscribed"], true);

    let reply = rpc(
        &mut ws2,
        2,
        "chat.send",
        Some(json!({"meetingId": mid, "senderId": "bob", "content": "Anyone there?"})),
    )
    .await;
    assert_eq!(reply["success"], true);

    // Bob still hears the echo; alice's detached channel does not
    assert!(
        read_until_event_type(&mut ws2, "chat-message").await.is_some()
    );
    assert!(
        read_until_event_type(&mut ws1, "chat-message").await.is_none(),
        "event delivered after unsubscribe"
    );

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_member_cannot_create_meetings() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let reply = rpc(
        &mut ws,
        1,
        "meeting.create",
        Some(json!({
            "title": "Shadow meeting",
            "scheduledFor": "2026-09-01T10:00:00Z",
            "creatorId": "dave",
        })),
    )
    .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error"]["code"], "PERMISSION_DENIED");

    // Nothing was written
    let reply = rpc(&mut ws, 2, "meeting.list", None).await;
    assert!(reply["result"]["meetings"].as_array().unwrap().is_empty());

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_unknown_participant_is_rejected() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let reply = rpc(
        &mut ws,
        1,
        "meeting.create",
        Some(json!({
            "title": "Ghost meeting",
            "scheduledFor": "2026-09-01T10:00:00Z",
            "creatorId": "zoe",
        })),
    )
    .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error"]["code"], "PARTICIPANT_NOT_FOUND");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_unknown_method() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let reply = rpc(&mut ws, 1, "meeting.teleport", None).await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error"]["code"], "METHOD_NOT_FOUND");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_empty_params_rejected() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let reply = rpc(&mut ws, 1, "meeting.create", Some(json!({}))).await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error"]["code"], "INVALID_PARAMS");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_meeting_not_found() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let reply = rpc(
        &mut ws,
        1,
        "meeting.get",
        Some(json!({"meetingId": "mtg_does_not_exist"})),
    )
    .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error"]["code"], "MEETING_NOT_FOUND");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_double_activate_conflicts() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let mid = activate_meeting(&mut ws, "Already running").await;
    let reply = rpc(
        &mut ws,
        1,
        "meeting.activate",
        Some(json!({"meetingId": mid, "actorId": "alice"})),
    )
    .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error"]["code"], "STATE_CONFLICT");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_voting_gated_on_item_and_status() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    // Voting on a discussion-only item
    let mid = activate_meeting(&mut ws, "Gated").await;
    let reply = rpc(
        &mut ws,
        1,
        "agenda.add",
        Some(json!({
            "meetingId": mid,
            "actorId": "alice",
            "title": "FYI only",
            "requiresVoting": false,
        })),
    )
    .await;
    let item_id = reply["result"]["agendaItem"]["id"].as_str().unwrap().to_string();

    let reply = rpc(
        &mut ws,
        2,
        "vote.cast",
        Some(json!({"agendaItemId": item_id, "voterId": "alice", "value": "yes"})),
    )
    .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error"]["code"], "VOTING_NOT_ALLOWED");

    // Voting while the meeting is still planned
    let planned = create_meeting(&mut ws, "Not yet").await;
    let reply = rpc(
        &mut ws,
        3,
        "agenda.add",
        Some(json!({
            "meetingId": planned,
            "actorId": "alice",
            "title": "Early motion",
            "requiresVoting": true,
        })),
    )
    .await;
    let item_id = reply["result"]["agendaItem"]["id"].as_str().unwrap().to_string();

    let reply = rpc(
        &mut ws,
        4,
        "vote.cast",
        Some(json!({"agendaItemId": item_id, "voterId": "alice", "value": "yes"})),
    )
    .await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error"]["code"], "VOTING_NOT_ALLOWED");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_malformed_frame_keeps_connection_alive() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    ws.send(Message::text("not valid json")).await.unwrap();

    let msg = next_json(&mut ws).await;
    assert_eq!(msg["success"], false);
    assert_eq!(msg["id"], "unknown");
    assert_eq!(msg["error"]["code"], "INVALID_PARAMS");

    // The connection survives the bad frame
    let reply = rpc(&mut ws, 1, "system.ping", None).await;
    assert_eq!(reply["success"], true);

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_replies_routed_per_connection() {
    let (url, server) = start_server().await;
    let mut ws1 = open_ws(&url).await;
    let mut ws2 = open_ws(&url).await;

    // Each connection gets its own reply, not its neighbour's.
    let resp1 = rpc(&mut ws1, 11, "system.ping", None).await;
    let resp2 = rpc(&mut ws2, 22, "system.ping", None).await;
    assert_eq!(resp1["id"], "r11");
    assert_eq!(resp2["id"], "r22");
    assert_eq!(resp1["success"], true);
    assert_eq!(resp2["success"], true);

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_pipelined_requests_all_answered() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    // Fire the whole burst before reading anything back.
    for i in 1..=50u64 {
        let req = json!({"id": format!("burst_{i}"), "method": "system.ping"});
        ws.send(Message::text(req.to_string())).await.unwrap();
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    let mut answered = 0u64;
    while answered < 50 {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let reply = match try_next_json(&mut ws, remaining).await {
            Some(reply) => reply,
            None => panic!("stream dried up after {answered} replies"),
        };
        if reply.get("id").and_then(Value::as_str).is_some() {
            assert_eq!(reply["success"], true);
            answered += 1;
        }
    }

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_state_survives_reconnect() {
    let (url, server) = start_server().await;

    let mid = {
        let mut ws = open_ws(&url).await;
        let mid = activate_meeting(&mut ws, "Durable").await;
        let reply = rpc(
            &mut ws,
            1,
            "chat.send",
            Some(json!({"meetingId": mid, "senderId": "alice", "content": "for the record"})),
        )
        .await;
        assert_eq!(reply["success"], true);
        mid
    };

    // A fresh connection sees everything the first one wrote
    let mut ws = open_ws(&url).await;
    let reply = rpc(&mut ws, 1, "meeting.get", Some(json!({"meetingId": mid}))).await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["result"]["meeting"]["status"], "active");

    let reply = rpc(&mut ws, 2, "chat.history", Some(json!({"meetingId": mid}))).await;
    let messages = reply["result"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "for the record");

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_connection_limit_rejects_with_503() {
    let (url, server) = start_server_with(ServerConfig {
        max_connections: 1,
        ..ServerConfig::default()
    })
    .await;

    // First client occupies the only slot
    let mut ws = open_ws(&url).await;
    let reply = rpc(&mut ws, 1, "system.ping", None).await;
    assert_eq!(reply["success"], true);

    let err = match connect_async(&url).await {
        Ok(_) => panic!("second connection should have been rejected"),
        Err(err) => err,
    };
    match err {
        tungstenite::Error::Http(response) => {
            assert_eq!(response.status().as_u16(), 503);
        }
        other => panic!("expected an http rejection, got {other}"),
    }

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_health_reports_live_counters() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let mid = activate_meeting(&mut ws, "Observable").await;
    let _ = rpc(
        &mut ws,
        1,
        "room.subscribe",
        Some(json!({"meetingId": mid, "participantId": "alice"})),
    )
    .await;

    let health_url = url.replacen("ws://", "http://", 1).replace("/ws", "/health");
    let body: Value = reqwest::get(&health_url)
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 1);
    assert_eq!(body["rooms"], 1);

    server.shutdown().trigger();
}

#[tokio::test]
async fn e2e_shutdown_closes_client_sockets() {
    let (url, server) = start_server().await;
    let mut ws = open_ws(&url).await;

    let reply = rpc(&mut ws, 1, "system.ping", None).await;
    assert_eq!(reply["success"], true);

    server.shutdown().trigger();

    // Tolerate either a Close frame or a torn socket once shutdown lands.
    let _ = timeout(Duration::from_secs(3), async {
        loop {
            match ws.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
}
