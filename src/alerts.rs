//! Derived operational alerts.

use indexmap::IndexMap;

use crate::models::{Contact, Rescuee};

// ---

/// Rescuee ids requiring attention: flagged emergency or lost contact.
///
/// Pure function over the rescuee mapping; the result is recomputed on every
/// state change and ordered by first-seen insertion order, not severity.
pub fn evaluate(rescuees: &IndexMap<String, Rescuee>) -> Vec<String> {
    // ---
    rescuees
        .values()
        .filter(|r| r.emergency || r.contact != Contact::Ok)
        .map(|r| r.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::Utc;

    fn rescuee(id: &str, emergency: bool, contact: Contact) -> Rescuee {
        // ---
        Rescuee {
            id: id.to_string(),
            bpm: Some(70),
            avg: Some(72),
            contact,
            emergency,
            rescued: false,
            last_seen: Utc::now(),
        }
    }

    fn map_of(entries: Vec<Rescuee>) -> IndexMap<String, Rescuee> {
        entries.into_iter().map(|r| (r.id.clone(), r)).collect()
    }

    #[test]
    fn test_membership_rules() {
        // ---
        let rescuees = map_of(vec![
            rescuee("R1", false, Contact::Ok),   // healthy
            rescuee("R2", true, Contact::Ok),    // emergency
            rescuee("R3", false, Contact::Lost), // lost contact
            rescuee("R4", true, Contact::Lost),  // both
        ]);
        assert_eq!(evaluate(&rescuees), vec!["R2", "R3", "R4"]);
    }

    #[test]
    fn test_clearing_conditions_removes_alert() {
        // ---
        let mut rescuees = map_of(vec![rescuee("R1", true, Contact::Lost)]);
        assert_eq!(evaluate(&rescuees), vec!["R1"]);

        rescuees.insert("R1".into(), rescuee("R1", false, Contact::Ok));
        assert!(evaluate(&rescuees).is_empty());
    }

    #[test]
    fn test_order_is_first_seen() {
        // ---
        let rescuees = map_of(vec![
            rescuee("R9", true, Contact::Ok),
            rescuee("R1", true, Contact::Ok),
        ]);
        assert_eq!(evaluate(&rescuees), vec!["R9", "R1"]);
    }
}
