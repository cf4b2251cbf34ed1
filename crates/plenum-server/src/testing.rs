//! Shared fixtures for this crate's unit tests.
//!
//! The roster has three founders and one plain member (`dave`), so role
//! gate rejections can be exercised without a second directory.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use plenum_core::types::Role;
use plenum_engine::{
    CreateMeetingRequest, EngineConfig, MeetingEngine, Profile, StaticDirectory,
};
use plenum_minutes::{
    DocumentRenderer, MeetingSummary, MinutesGenerator, RenderRequest, RenderedDocument,
};
use plenum_store::{MeetingStore, memory_pool, run_migrations};

use crate::rpc::context::RpcContext;
use crate::rpc::registry::RpcRegistry;
use crate::server::{AppState, ServerConfig};
use crate::websocket::broadcast::RoomBroadcaster;

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

fn test_store() -> Arc<MeetingStore> {
    let pool = memory_pool().unwrap();
    {
        let conn = pool.get().unwrap();
        let _ = run_migrations(&conn).unwrap();
    }
    Arc::new(MeetingStore::new(pool))
}

pub(crate) fn test_directory() -> Arc<StaticDirectory> {
    let roster = [
        ("alice", "Alice", Role::Founder),
        ("bob", "Bob", Role::Founder),
        ("carol", "Carol", Role::Founder),
        ("dave", "Dave", Role::Member),
    ];
    Arc::new(StaticDirectory::from_entries(roster.into_iter().map(
        |(id, name, role)| {
            (
                id.to_string(),
                Profile {
                    display_name: name.to_string(),
                    role,
                },
            )
        },
    )))
}

pub(crate) fn test_context() -> RpcContext {
    let directory = test_directory();
    let engine = Arc::new(MeetingEngine::new(
        test_store(),
        directory.clone(),
        Arc::new(StubGenerator),
        Arc::new(StubRenderer),
        EngineConfig::default(),
    ));
    RpcContext::new(engine, directory)
}

pub(crate) fn test_state() -> AppState {
    let mut registry = RpcRegistry::new();
    crate::rpc::handlers::register_all(&mut registry);
    AppState {
        registry: Arc::new(registry),
        ctx: test_context(),
        broadcaster: Arc::new(RoomBroadcaster::new()),
        config: Arc::new(ServerConfig::default()),
        metrics: metrics_handle(),
    }
}

/// One recorder per test binary; later installs would fail.
pub(crate) fn metrics_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| crate::metrics::install_recorder().expect("install prometheus recorder"))
        .clone()
}

/// Create a planned meeting owned by alice, returning its id.
pub(crate) fn planned_meeting(ctx: &RpcContext) -> String {
    ctx.engine
        .create_meeting(&CreateMeetingRequest {
            title: "Quarterly planning".into(),
            description: None,
            scheduled_for: "2026-09-01T10:00:00+00:00".into(),
            creator_id: "alice".into(),
        })
        .unwrap()
        .id
        .into_inner()
}

/// Create and activate a meeting, returning its id.
pub(crate) async fn active_meeting(ctx: &RpcContext) -> String {
    let meeting_id = planned_meeting(ctx);
    let _ = ctx.engine.activate_meeting(&meeting_id).await.unwrap();
    meeting_id
}
