//! CSV export endpoint.

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use chrono::Utc;
use tracing::info;

use crate::export::to_csv;
use crate::SnapshotRx;

// ---

pub fn router() -> Router<SnapshotRx> {
    // ---
    Router::new().route("/export.csv", get(export))
}

/// Handle `GET /export.csv`: render the latest snapshot as CSV.
async fn export(State(snapshots): State<SnapshotRx>) -> impl IntoResponse {
    // ---
    let snap = snapshots.borrow().clone();
    let body = to_csv(&snap, Utc::now());
    info!("GET /export.csv - {} rows", body.lines().count().saturating_sub(1));
    ([(header::CONTENT_TYPE, "text/csv")], body)
}
