//! The ingestion engine: one owner for all live state.
//!
//! A single task drains raw lines from the ingestion queue and processes
//! each to completion (parse → classify → upsert → re-evaluate alerts →
//! publish) before taking the next. That queue is the serialization point;
//! the engine itself has no locking. Snapshots fan out through a
//! [`tokio::sync::watch`] channel: consumers always see the latest state,
//! and a slow or absent consumer never blocks ingestion.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::models::Snapshot;
use crate::record::{self, Record};
use crate::store::StateStore;

// ---

/// Read side of the snapshot fan-out. Cheap to clone; one per consumer.
pub type SnapshotRx = watch::Receiver<Arc<Snapshot>>;

pub struct Engine {
    // ---
    store: StateStore,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
}

impl Engine {
    // ---
    /// Create an engine plus the receiver consumers subscribe through.
    /// The channel starts out holding an empty snapshot.
    pub fn new() -> (Self, SnapshotRx) {
        // ---
        let store = StateStore::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(store.snapshot(Utc::now())));
        (
            Engine { store, snapshot_tx },
            snapshot_rx,
        )
    }

    /// Drain the ingestion queue until every sender is gone.
    pub async fn run(mut self, mut lines: mpsc::Receiver<String>) {
        // ---
        while let Some(line) = lines.recv().await {
            self.process_line(&line);
        }
        debug!("ingestion queue closed, engine stopping");
    }

    /// Process one raw line to completion and publish the resulting
    /// snapshot. Malformed input never escapes as an error; the worst case
    /// is "no state change for this line".
    pub fn process_line(&mut self, line: &str) {
        // ---
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let fields = record::parse_line(line);
        match record::classify(&fields) {
            Ok(Record::Rescuee(rec)) => {
                debug!(id = %rec.id, "upserting rescuee");
                self.store.upsert_rescuee(rec, Utc::now());
            }
            Ok(Record::Rescuer(rec)) => {
                debug!(id = %rec.id, target = ?rec.target, "upserting rescuer");
                self.store.upsert_rescuer(rec, Utc::now());
            }
            Err(e) => {
                // Discarded, but the snapshot is still republished below so
                // consumers observe one publication per processed line.
                warn!("discarding record: {e} (line: {line:?})");
            }
        }

        self.publish();
    }

    fn publish(&self) {
        // ---
        let snapshot = Arc::new(self.store.snapshot(Utc::now()));
        // send_replace never fails or blocks, with or without receivers.
        self.snapshot_tx.send_replace(snapshot);
    }
}
