//! Live state store for the rescue population.
//!
//! Owns the three mappings (rescuees, rescuers, proximity links) and applies
//! classified records under last-write-wins rules. All maps are
//! insertion-ordered so that alert ordering and export row ordering reflect
//! first-seen order, not hash order. The store is exclusively owned by the
//! ingestion engine; consumers only ever see cloned snapshots.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::models::{ProximityLink, Rescuee, Rescuer, Snapshot};
use crate::record::{RescueeRecord, RescuerRecord};

// ---

#[derive(Debug, Default)]
pub struct StateStore {
    // ---
    rescuees: IndexMap<String, Rescuee>,
    rescuers: IndexMap<String, Rescuer>,
    /// rescuee id → links observed against it, in insertion order. At most
    /// one entry per rescuer id. Never shrinks except by per-pair overwrite.
    links: IndexMap<String, Vec<ProximityLink>>,
}

impl StateStore {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for this rescuee id in full. Fields absent from the
    /// record become unknown/default; nothing survives from a prior entry.
    pub fn upsert_rescuee(&mut self, record: RescueeRecord, now: DateTime<Utc>) {
        // ---
        let rescuee = record.into_rescuee(now);
        self.rescuees.insert(rescuee.id.clone(), rescuee);
    }

    /// Replace the entry for this rescuer id in full, and if the record
    /// carries a target, upsert the (rescuer, target) proximity link:
    /// any prior link for the same pair is removed before the new one is
    /// appended. Without a target no link is touched; stale links persist
    /// until overwritten (there is no eviction).
    pub fn upsert_rescuer(&mut self, record: RescuerRecord, now: DateTime<Utc>) {
        // ---
        if let Some((target, link)) = record.to_link() {
            let links = self.links.entry(target).or_default();
            links.retain(|l| l.rescuer_id != link.rescuer_id);
            links.push(link);
        }
        let rescuer = record.to_rescuer(now);
        self.rescuers.insert(rescuer.id.clone(), rescuer);
    }

    /// Clone the current state into an immutable snapshot with freshly
    /// evaluated alerts.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Snapshot {
        // ---
        Snapshot {
            rescuees: self.rescuees.clone(),
            rescuers: self.rescuers.clone(),
            links: self.links.clone(),
            alerts: crate::alerts::evaluate(&self.rescuees),
            generated_at: now,
        }
    }
}
