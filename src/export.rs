//! CSV rendering of a state snapshot.
//!
//! Format (one header, then data rows):
//!   time,type,id,info1,info2
//!   <last_seen>,RESCUEE,<id>,<bpm>,<avg>,<contact>,EMERGENCY=<0|1>
//!   <export_time>,RESCUER,<rescuer_id>,TARGET=<rescuee_id>,<rssi>
//!
//! Rescuee rows come first in mapping (first-seen) order, then link rows
//! grouped by rescuee id in mapping order, links in insertion order within
//! each group. Unknown numeric fields render as empty cells.

use chrono::{DateTime, Utc};

use crate::models::Snapshot;

const CSV_HEADER: &str = "time,type,id,info1,info2";
const TIME_FORMAT: &str = "%H:%M:%S";

// ---

/// Render a snapshot as CSV. Rescuee rows carry that rescuee's last-seen
/// time; link rows carry the export time, matching the device log format.
pub fn to_csv(snapshot: &Snapshot, now: DateTime<Utc>) -> String {
    // ---
    let mut rows = vec![CSV_HEADER.to_string()];

    for r in snapshot.rescuees.values() {
        rows.push(format!(
            "{},RESCUEE,{},{},{},{},EMERGENCY={}",
            r.last_seen.format(TIME_FORMAT),
            r.id,
            opt(r.bpm),
            opt(r.avg),
            r.contact.as_str(),
            u8::from(r.emergency),
        ));
    }

    let stamp = now.format(TIME_FORMAT);
    for (rescuee_id, links) in &snapshot.links {
        for link in links {
            rows.push(format!(
                "{},RESCUER,{},TARGET={},{}",
                stamp,
                link.rescuer_id,
                rescuee_id,
                opt(link.rssi),
            ));
        }
    }

    rows.join("\n") + "\n"
}

fn opt<N: ToString>(value: Option<N>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}
