use axum::Router;

use crate::SnapshotRx;

mod export;
mod health;
mod snapshot;

// ---

pub fn router(snapshots: SnapshotRx) -> Router {
    // ---
    Router::new()
        .merge(snapshot::router())
        .merge(export::router())
        .merge(health::router())
        .with_state(snapshots)
}
