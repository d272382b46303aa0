use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{Event, EventsPayload};

/// Save events to a JSON file in the same shape the API returns.
pub fn save_snapshot(events: &[Event], path: &Path) -> Result<()> {
    let payload = EventsPayload {
        events: events.to_vec(),
    };
    let json = serde_json::to_string_pretty(&payload).context("Failed to serialize events")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Load events from a JSON file saved by [`save_snapshot`] or captured from the API.
pub fn load_snapshot(path: &Path) -> Result<Vec<Event>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let payload: EventsPayload = serde_json::from_str(&json)
        .with_context(|| format!("{} is not an events snapshot", path.display()))?;
    Ok(payload.events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn loads_captured_api_response() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all-events.json");
        std::fs::write(
            &path,
            r#"{"events":[{"id":7,"name":"Conference","event_blocks":[
                {"id":70,"name":"Talks","start_date":"2024-10-01T09:00:00","end_date":"2024-10-03"}
            ]}]}"#,
        )
        .unwrap();

        let events = load_snapshot(&path).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].event_blocks[0].start_date,
            NaiveDate::from_ymd_opt(2024, 10, 1)
        );

        let copy = dir.path().join("copy.json");
        save_snapshot(&events, &copy).unwrap();
        assert_eq!(load_snapshot(&copy).unwrap(), events);
    }

    #[test]
    fn rejects_non_snapshot_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.json");
        std::fs::write(&path, r#"{"events": {"id": 1}}"#).unwrap();
        assert!(load_snapshot(&path).is_err());
    }
}
