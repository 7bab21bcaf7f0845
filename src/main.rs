//! Application entry point for the `vibrasense-rescueflow` service.
//!
//! This binary orchestrates the full startup sequence for the rescue
//! telemetry pipeline, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Starting the single-owner ingestion engine and its line queue
//! - Binding the TCP line-ingest listener for telemetry producers
//! - Optionally starting the synthetic load generator
//! - Binding the Axum HTTP read surface and serving requests
//!
//! # Environment Variables
//! - `INGEST_ADDR` (optional) – TCP line-ingest bind address (default: `0.0.0.0:9600`)
//! - `HTTP_ADDR` (optional) – HTTP bind address (default: `0.0.0.0:8080`)
//! - `SIM_ENABLED` (optional) – `1` starts the simulator
//! - `RESCUEFLOW_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `RESCUEFLOW_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! This module delegates record handling to `engine`, configuration parsing
//! to `config`, and route registration to `routes`.
use std::{env, io::IsTerminal};

use anyhow::{anyhow, Result};
use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

mod alerts;
mod config;
mod engine;
mod export;
mod ingest;
mod models;
mod record;
mod routes;
mod sim;
mod store;

pub use config::Config;

// Not used here directly but re-exported for routes/*.rs, that way refactoring
// is easier since routes/*.rs do not have knowledge of engine.rs, only of
// their parent module (main.rs)
pub use engine::SnapshotRx;

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    // Engine task: sole owner of the state store, fed by one bounded queue.
    let (engine, snapshots) = engine::Engine::new();
    let (line_tx, line_rx) = mpsc::channel(cfg.ingest_queue_depth as usize);
    tokio::spawn(engine.run(line_rx));

    // Line transport for telemetry producers.
    let ingest_listener = TcpListener::bind(&cfg.ingest_addr)
        .await
        .map_err(|e| anyhow!("Failed to bind ingest listener on '{}': {}", cfg.ingest_addr, e))?;
    tokio::spawn(ingest::serve(ingest_listener, line_tx.clone()));

    if cfg.sim_enabled {
        tokio::spawn(sim::run(cfg.clone(), line_tx.clone()));
    }

    // Build app from routes gateway
    let app: Router = routes::router(snapshots);

    let listener = TcpListener::bind(&cfg.http_addr)
        .await
        .map_err(|e| anyhow!("Failed to bind HTTP listener on '{}': {}", cfg.http_addr, e))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `RESCUEFLOW_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `RESCUEFLOW_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked. It installs the subscriber globally
/// for the lifetime of the process.
fn init_tracing() {
    // ---
    let span_events = match env::var("RESCUEFLOW_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to RESCUEFLOW_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("RESCUEFLOW_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(level.to_string())
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
