//! Snapshot and alert read endpoints.
//!
//! Consumers (dashboards, exporters) poll these instead of subscribing to
//! the watch channel directly; either way they only ever observe the latest
//! published state and can never block ingestion.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::debug;

use crate::models::Snapshot;
use crate::SnapshotRx;

// ---

pub fn router() -> Router<SnapshotRx> {
    // ---
    Router::new()
        .route("/snapshot", get(snapshot))
        .route("/alerts", get(alerts))
}

/// Handle `GET /snapshot`: the full published state as JSON.
async fn snapshot(State(snapshots): State<SnapshotRx>) -> Json<Snapshot> {
    // ---
    let snap = snapshots.borrow().as_ref().clone();
    debug!(
        "GET /snapshot - {} rescuees, {} rescuers",
        snap.rescuees.len(),
        snap.rescuers.len()
    );
    Json(snap)
}

/// JSON response body for the `/alerts` endpoint.
#[derive(Serialize)]
struct AlertsResponse {
    count: usize,
    alerts: Vec<String>,
}

/// Handle `GET /alerts`: rescuee ids currently alerting, first-seen order.
async fn alerts(State(snapshots): State<SnapshotRx>) -> Json<AlertsResponse> {
    // ---
    let alerts = snapshots.borrow().alerts.clone();
    Json(AlertsResponse {
        count: alerts.len(),
        alerts,
    })
}
