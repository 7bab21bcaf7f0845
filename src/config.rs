//! Configuration loader for the `vibrasense-rescueflow` service.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). By consolidating configuration logic
//! here, we avoid scattering `env::var` calls throughout the codebase.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! parse_env_str {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// TCP address where telemetry producers connect.
    pub ingest_addr: String,

    /// HTTP address for the snapshot/export read surface.
    pub http_addr: String,

    /// Bound on the raw-line ingestion queue between transport and engine.
    pub ingest_queue_depth: u32,

    /// Whether the synthetic load generator runs.
    pub sim_enabled: bool,

    /// Simulated rescuee population size.
    pub sim_rescuees: u32,

    /// Simulated rescuer population size.
    pub sim_rescuers: u32,

    /// Milliseconds between simulation ticks.
    pub sim_interval_ms: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `INGEST_ADDR` – TCP line-ingest bind address (default: `0.0.0.0:9600`)
/// - `HTTP_ADDR` – HTTP bind address (default: `0.0.0.0:8080`)
/// - `INGEST_QUEUE_DEPTH` – raw-line queue bound (default: 1024)
/// - `SIM_ENABLED` – `1` starts the synthetic load generator (default: off)
/// - `SIM_RESCUEES` – simulated rescuee count (default: 2000)
/// - `SIM_RESCUERS` – simulated rescuer count (default: 100)
/// - `SIM_INTERVAL_MS` – simulation tick period (default: 3000)
///
/// Returns an error if any numeric variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let ingest_addr = parse_env_str!("INGEST_ADDR", "0.0.0.0:9600");
    let http_addr = parse_env_str!("HTTP_ADDR", "0.0.0.0:8080");
    let ingest_queue_depth = parse_env_u32!("INGEST_QUEUE_DEPTH", 1024);
    let sim_enabled = env::var("SIM_ENABLED").as_deref() == Ok("1");
    let sim_rescuees = parse_env_u32!("SIM_RESCUEES", 2000);
    let sim_rescuers = parse_env_u32!("SIM_RESCUERS", 100);
    let sim_interval_ms = parse_env_u32!("SIM_INTERVAL_MS", 3000);

    Ok(Config {
        ingest_addr,
        http_addr,
        ingest_queue_depth,
        sim_enabled,
        sim_rescuees,
        sim_rescuers,
        sim_interval_ms,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  INGEST_ADDR        : {}", self.ingest_addr);
        tracing::info!("  HTTP_ADDR          : {}", self.http_addr);
        tracing::info!("  INGEST_QUEUE_DEPTH : {}", self.ingest_queue_depth);
        tracing::info!("  SIM_ENABLED        : {}", self.sim_enabled);
        if self.sim_enabled {
            tracing::info!("  SIM_RESCUEES       : {}", self.sim_rescuees);
            tracing::info!("  SIM_RESCUERS       : {}", self.sim_rescuers);
            tracing::info!("  SIM_INTERVAL_MS    : {}", self.sim_interval_ms);
        }
    }
}
