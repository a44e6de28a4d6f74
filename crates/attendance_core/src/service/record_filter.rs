//! Admin search over the attendance log.
//!
//! # Invariants
//! - Filtering is pure and never reorders records.
//! - Query matching is case-insensitive substring on name or code.
//! - Event matching is exact.

use crate::model::record::AttendanceRecord;

/// Sentinel label the admin picker uses for "no event filter".
pub const ALL_EVENTS: &str = "All Events";

/// Event selection for the admin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    All,
    Event(String),
}

impl EventFilter {
    /// Maps the picker label onto a filter; blank means all events.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() || trimmed == ALL_EVENTS {
            Self::All
        } else {
            Self::Event(trimmed.to_string())
        }
    }

    fn matches(&self, record: &AttendanceRecord) -> bool {
        match self {
            Self::All => true,
            Self::Event(event_id) => record.event_id == *event_id,
        }
    }
}

/// Returns records matching `query` and `event`, in stored order.
pub fn filter_records<'a>(
    records: &'a [AttendanceRecord],
    query: &str,
    event: &EventFilter,
) -> Vec<&'a AttendanceRecord> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|record| event.matches(record))
        .filter(|record| {
            needle.is_empty()
                || record.employee_name.to_lowercase().contains(&needle)
                || record.employee_id.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Distinct event ids in first-seen order.
pub fn distinct_event_ids(records: &[AttendanceRecord]) -> Vec<String> {
    let mut seen = Vec::new();
    for record in records {
        if !seen.contains(&record.event_id) {
            seen.push(record.event_id.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::{distinct_event_ids, filter_records, EventFilter, ALL_EVENTS};
    use crate::model::employee::{Employee, EmployeeInput};
    use crate::model::record::AttendanceRecord;
    use chrono::Utc;

    fn record(name: &str, code: &str, event: &str) -> AttendanceRecord {
        let employee = Employee::new(EmployeeInput::parse(name, code).unwrap(), None);
        AttendanceRecord::check_in(&employee, event, Utc::now())
    }

    #[test]
    fn sentinel_and_blank_labels_mean_all_events() {
        assert_eq!(EventFilter::from_label(ALL_EVENTS), EventFilter::All);
        assert_eq!(EventFilter::from_label("  "), EventFilter::All);
        assert_eq!(
            EventFilter::from_label(" Standup "),
            EventFilter::Event("Standup".to_string())
        );
    }

    #[test]
    fn query_matches_code_and_event_filter_narrows() {
        let records = vec![
            record("Jane Smith", "E-100", "Standup"),
            record("John Doe", "E-200", "Standup"),
            record("Jane Smith", "E-100", "Retro"),
        ];

        let by_code = filter_records(&records, "e-2", &EventFilter::All);
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].employee_name, "John Doe");

        let retro = filter_records(&records, "", &EventFilter::Event("Retro".to_string()));
        assert_eq!(retro.len(), 1);
        assert_eq!(retro[0].event_id, "Retro");
    }

    #[test]
    fn distinct_events_keep_first_seen_order() {
        let records = vec![
            record("A", "1", "Retro"),
            record("B", "2", "Standup"),
            record("C", "3", "Retro"),
        ];
        assert_eq!(distinct_event_ids(&records), vec!["Retro", "Standup"]);
    }
}
