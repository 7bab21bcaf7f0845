//! Domain models for the rescue telemetry pipeline.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::record::{RescueeRecord, RescuerRecord};

// ---

/// Contact state reported by a rescuee beacon. Anything other than the exact
/// literal "OK" on the wire (including absence) is lost contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Contact {
    Ok,
    Lost,
}

impl Contact {
    // ---
    pub fn from_field(value: Option<&str>) -> Self {
        match value {
            Some("OK") => Contact::Ok,
            _ => Contact::Lost,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Contact::Ok => "OK",
            Contact::Lost => "LOST",
        }
    }
}

/// Operational state of a rescuer scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RescuerStatus {
    Ready,
    Engaged,
}

/// Live state of a tracked rescue target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rescuee {
    // ---
    pub id: String,
    pub bpm: Option<u32>,
    pub avg: Option<u32>,
    pub contact: Contact,
    pub emergency: bool,
    pub rescued: bool,
    pub last_seen: DateTime<Utc>,
}

/// Live state of a tracked rescuer scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rescuer {
    // ---
    pub id: String,
    pub status: RescuerStatus,
    pub last_seen: DateTime<Utc>,
}

/// One observed rescuer-to-rescuee proximity pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProximityLink {
    // ---
    pub rescuer_id: String,
    pub rssi: Option<i32>,
    pub emergency: bool,
}

/// Immutable view of the full engine state, published to consumers after
/// every processed line. Map iteration order is first-seen insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    // ---
    pub rescuees: IndexMap<String, Rescuee>,
    pub rescuers: IndexMap<String, Rescuer>,
    pub links: IndexMap<String, Vec<ProximityLink>>,
    /// Rescuee ids currently alerting, in first-seen order.
    pub alerts: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

// ---

impl RescueeRecord {
    /// Build a fresh store entry from this record. Fields the record did not
    /// carry come out unknown/default; nothing is inherited from any prior
    /// entry for the same id.
    pub fn into_rescuee(self, now: DateTime<Utc>) -> Rescuee {
        // ---
        Rescuee {
            id: self.id,
            bpm: self.bpm,
            avg: self.avg,
            contact: Contact::from_field(self.contact.as_deref()),
            emergency: self.emergency,
            rescued: self.rescued,
            last_seen: now,
        }
    }
}

impl RescuerRecord {
    /// Build a fresh store entry from this record.
    ///
    /// An explicit `STATUS` of READY/ENGAGED (any case) wins; otherwise the
    /// status is inferred from whether the record carries a target.
    pub fn to_rescuer(&self, now: DateTime<Utc>) -> Rescuer {
        // ---
        let status = match self.status.as_deref().map(|s| s.to_uppercase()).as_deref() {
            Some("READY") => RescuerStatus::Ready,
            Some("ENGAGED") => RescuerStatus::Engaged,
            _ if self.target.is_some() => RescuerStatus::Engaged,
            _ => RescuerStatus::Ready,
        };
        Rescuer {
            id: self.id.clone(),
            status,
            last_seen: now,
        }
    }

    /// The proximity link this record observes, if it carries a target.
    pub fn to_link(&self) -> Option<(String, ProximityLink)> {
        // ---
        self.target.as_ref().map(|target| {
            (
                target.clone(),
                ProximityLink {
                    rescuer_id: self.id.clone(),
                    rssi: self.rssi,
                    emergency: self.emergency,
                },
            )
        })
    }
}
