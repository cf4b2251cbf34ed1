//! # plenumd
//!
//! Plenum meeting server binary. Wires the store, engine, collaborators,
//! and gateway together and runs until interrupted.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use plenum_core::logging::init_tracing;
use plenum_engine::{
    EngineConfig, LogNotifier, MeetingEngine, Profile, ReminderSweep, StaticDirectory,
};
use plenum_minutes::{HttpDocumentRenderer, HttpMinutesGenerator};
use plenum_server::rpc::context::RpcContext;
use plenum_server::rpc::registry::RpcRegistry;
use plenum_server::websocket::event_bridge::spawn_event_bridge;
use plenum_server::{PlenumServer, ServerConfig};
use plenum_settings::{PlenumSettings, load_settings};
use plenum_store::{ConnectionConfig, MeetingStore, file_pool, run_migrations};

/// Plenum meeting server.
#[derive(Parser, Debug)]
#[command(name = "plenumd", about = "Founders' meeting server")]
struct Cli {
    /// Host to bind (overrides settings if specified).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings if specified; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings if specified).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Log level when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// `~/.plenum`, the directory for the database and settings file.
fn plenum_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".plenum")
}

/// CLI path wins; otherwise the settings path, resolved under
/// [`plenum_home`] when relative.
fn resolve_db_path(cli_path: Option<PathBuf>, settings: &PlenumSettings) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }
    let configured = PathBuf::from(&settings.server.db_path);
    if configured.is_absolute() {
        configured
    } else {
        plenum_home().join(configured)
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create database directory {}", parent.display()))
}

/// Build the roster-backed directory from settings.
fn directory_from_settings(settings: &PlenumSettings) -> Arc<StaticDirectory> {
    Arc::new(StaticDirectory::from_entries(settings.roster.iter().map(
        |entry| {
            (
                entry.id.clone(),
                Profile {
                    display_name: entry.display_name.clone(),
                    role: entry.role,
                },
            )
        },
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings = load_settings().unwrap_or_default();
    init_tracing(&args.log_level);

    // Database
    let db_path = resolve_db_path(args.db_path, &settings);
    ensure_parent_dir(&db_path)?;
    let db_str = db_path.to_string_lossy();
    let pool =
        file_pool(&db_str, &ConnectionConfig::default()).context("Failed to open database")?;
    {
        let conn = pool.get().context("Failed to get DB connection")?;
        let version = run_migrations(&conn).context("Failed to run migrations")?;
        tracing::info!(path = %db_path.display(), schema_version = version, "database ready");
    }
    let store = Arc::new(MeetingStore::new(pool));

    // Roster
    let directory = directory_from_settings(&settings);
    if directory.is_empty() {
        tracing::warn!(
            "roster is empty: no participant can pass the founder gate until \
             settings.json lists one"
        );
    } else {
        tracing::info!(participants = directory.len(), "roster loaded");
    }

    // Minutes collaborators
    let timeout = Duration::from_millis(settings.minutes.timeout_ms);
    let generator = Arc::new(
        HttpMinutesGenerator::new(
            &settings.minutes.text_base_url,
            &settings.minutes.model,
            settings.minutes.api_key.clone(),
            timeout,
        )
        .context("Failed to build text service client")?,
    );
    let renderer = Arc::new(
        HttpDocumentRenderer::new(&settings.minutes.render_base_url, timeout)
            .context("Failed to build render service client")?,
    );

    // Engine
    let engine = Arc::new(MeetingEngine::new(
        store.clone(),
        directory.clone(),
        generator,
        renderer,
        EngineConfig {
            quorum: settings.governance.quorum,
        },
    ));

    // Metrics recorder, before anything emits a metric
    let metrics = plenum_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;

    // RPC surface
    let mut registry = RpcRegistry::new();
    plenum_server::rpc::handlers::register_all(&mut registry);
    let method_count = registry.method_names().len();
    let ctx = RpcContext::new(engine.clone(), directory);

    let config = ServerConfig {
        host: args.host.unwrap_or_else(|| settings.server.host.clone()),
        port: args.port.unwrap_or(settings.server.port),
        max_connections: settings.server.max_connections,
        heartbeat_interval: Duration::from_secs(settings.server.heartbeat_interval_secs),
        heartbeat_timeout: Duration::from_secs(settings.server.heartbeat_timeout_secs),
    };

    let server = PlenumServer::new(config, registry, ctx, metrics);

    // Background tasks: room event bridge and the reminder sweep
    let bridge_task = spawn_event_bridge(
        engine.clone(),
        server.broadcaster().clone(),
        server.shutdown().signal(),
    );
    let sweep = ReminderSweep::new(
        store,
        Arc::new(LogNotifier),
        settings.governance.reminder_window_hours,
        Duration::from_secs(settings.governance.reminder_interval_secs),
    );
    let sweep_task = tokio::spawn(sweep.run(server.shutdown().signal()));

    let (addr, server_task) = server.listen().await.context("Failed to bind server")?;
    tracing::info!(
        "{} {} listening on http://{addr} ({method_count} RPC methods registered)",
        plenum_core::constants::NAME,
        plenum_core::constants::VERSION,
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("shutting down");
    server
        .shutdown()
        .drain(vec![server_task, bridge_task, sweep_task], None)
        .await;
    tracing::info!("shutdown complete");
    Ok(())
}
