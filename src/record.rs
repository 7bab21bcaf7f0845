//! Wire-line parsing and record classification.
//!
//! Field devices emit one record per line in the form
//! `TYPE=RESCUEE,KEY=VALUE,KEY=VALUE,...`. This module turns a raw line into
//! a loose field map ([`parse_line`]) and then into a typed record variant
//! ([`classify`]), so everything downstream of classification works with a
//! closed set of shapes instead of string lookups.

use std::collections::HashMap;

use thiserror::Error;

// ---

/// Loose key/value view of a single wire line. Built fresh per line and
/// discarded after classification.
pub type FieldMap = HashMap<String, String>;

/// Data-quality outcomes from classification. None of these abort ingestion;
/// the engine logs them and moves on to the next line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    // ---
    /// `TYPE` missing or not one of the known record kinds.
    #[error("unknown record type: {0:?}")]
    UnknownType(Option<String>),

    /// A classified record without the required `ID` field.
    #[error("{kind} record missing required ID field")]
    MissingId { kind: &'static str },
}

/// A classified telemetry record, ready for a state-store upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Rescuee(RescueeRecord),
    Rescuer(RescuerRecord),
}

/// Telemetry from a rescue-target beacon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescueeRecord {
    // ---
    pub id: String,
    pub bpm: Option<u32>,
    pub avg: Option<u32>,
    pub contact: Option<String>,
    pub emergency: bool,
    pub rescued: bool,
}

/// Telemetry from a mobile rescuer scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescuerRecord {
    // ---
    pub id: String,
    pub status: Option<String>,
    pub target: Option<String>,
    pub rssi: Option<i32>,
    pub emergency: bool,
}

// ---

/// Split one raw line into a field map.
///
/// Tokens are comma-separated `key=value` pairs; both sides are trimmed.
/// A token without `=` or with an empty key contributes nothing (dropped
/// silently, not an error). If a key repeats, the last occurrence wins.
pub fn parse_line(line: &str) -> FieldMap {
    // ---
    let mut fields = FieldMap::new();
    for token in line.split(',') {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        fields.insert(key.to_string(), value.trim().to_string());
    }
    fields
}

/// Classify a field map into a typed record.
///
/// `TYPE` is matched case-insensitively. A known type without an `ID` is
/// rejected outright rather than producing an entry under an undefined key.
pub fn classify(fields: &FieldMap) -> Result<Record, RecordError> {
    // ---
    let kind = fields.get("TYPE").map(|t| t.to_uppercase());

    match kind.as_deref() {
        Some("RESCUEE") => {
            let id = require_id(fields, "RESCUEE")?;
            Ok(Record::Rescuee(RescueeRecord {
                id,
                bpm: parse_number(fields, "BPM"),
                avg: parse_number(fields, "AVG"),
                contact: non_empty(fields, "CONTACT"),
                emergency: flag_set(fields, "EMERGENCY"),
                rescued: flag_set(fields, "RESCUED"),
            }))
        }
        Some("RESCUER") => {
            let id = require_id(fields, "RESCUER")?;
            Ok(Record::Rescuer(RescuerRecord {
                id,
                status: non_empty(fields, "STATUS"),
                target: non_empty(fields, "TARGET"),
                rssi: parse_number(fields, "RSSI"),
                emergency: flag_set(fields, "EMERGENCY"),
            }))
        }
        _ => Err(RecordError::UnknownType(kind)),
    }
}

// ---

fn require_id(fields: &FieldMap, kind: &'static str) -> Result<String, RecordError> {
    // ---
    match fields.get("ID").map(|s| s.as_str()) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(RecordError::MissingId { kind }),
    }
}

/// Numeric policy: present but unparseable means unknown, never an error.
fn parse_number<N: std::str::FromStr>(fields: &FieldMap, key: &str) -> Option<N> {
    fields.get(key).and_then(|v| v.parse().ok())
}

/// Boolean fields are set only by the exact string "1".
fn flag_set(fields: &FieldMap, key: &str) -> bool {
    fields.get(key).map(|v| v == "1").unwrap_or(false)
}

fn non_empty(fields: &FieldMap, key: &str) -> Option<String> {
    fields
        .get(key)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

// ---
