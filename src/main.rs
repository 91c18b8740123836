//! chillr-tickets server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use chillr_tickets::api;
use chillr_tickets::app_state::AppState;
use chillr_tickets::config::{LogFormat, TicketingConfig};
use chillr_tickets::persistence::PostgresPersistence;
use chillr_tickets::persistence::recorder::{self, SnapshotCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TicketingConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting chillr-tickets");
    if config.uses_development_secret() {
        tracing::warn!("JWT_SECRET not set, signing tokens with the development secret");
    }

    let app_state = AppState::from_config(&config);

    let persistence = if config.persistence_enabled {
        let db = PostgresPersistence::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        db.migrate().await.context("running migrations")?;
        recorder::restore_state(&db, &app_state)
            .await
            .context("restoring snapshots")?;
        if config.event_log_enabled {
            recorder::spawn_event_log(db.clone(), &app_state.event_bus);
        }
        recorder::spawn_snapshots(
            db.clone(),
            app_state.clone(),
            config.snapshot_interval_secs,
            config.cleanup_after_days,
        );
        Some(db)
    } else {
        tracing::info!("persistence disabled, state is in-memory only");
        None
    };

    let app = api::build_app(app_state.clone(), &config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(db) = persistence {
        let written = recorder::snapshot_once(&db, &app_state, &mut SnapshotCache::new())
            .await
            .context("final snapshot")?;
        tracing::info!(written, "final snapshot saved");
    }
    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
