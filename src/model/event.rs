use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// A time-bounded block inside an event, drawn as one bar on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: i64,
    pub name: String,
    /// `None` when the API sent a date that could not be read.
    #[serde(alias = "startDate", default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(alias = "endDate", default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl Block {
    /// Start and end, if both are known.
    pub fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start_date?, self.end_date?))
    }
}

/// A row in the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_blocks: Vec<Block>,
}

/// Body of the event list endpoints and of saved snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<Event>,
}

/// Read a date the way the API sends it: RFC 3339 timestamps are converted to
/// the local calendar day, naive timestamps and plain dates are taken as-is.
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local).date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.date());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ts.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_api_date))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_api_payload() {
        let json = r#"{
            "events": [
                {
                    "id": 1,
                    "name": "Release train",
                    "event_blocks": [
                        {
                            "id": 10,
                            "name": "Freeze",
                            "start_date": "2024-06-10",
                            "end_date": "2024-06-12T18:30:00",
                            "description": "Code freeze",
                            "link": "https://example.org/freeze"
                        },
                        {
                            "id": 11,
                            "name": "Ship",
                            "startDate": "2024-06-13",
                            "endDate": "2024-06-13"
                        }
                    ]
                },
                { "id": 2, "name": "Empty", "event_blocks": null }
            ]
        }"#;
        let payload: EventsPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.events.len(), 2);

        let freeze = &payload.events[0].event_blocks[0];
        assert_eq!(freeze.dates(), Some((d(2024, 6, 10), d(2024, 6, 12))));
        assert_eq!(freeze.link.as_deref(), Some("https://example.org/freeze"));

        let ship = &payload.events[0].event_blocks[1];
        assert_eq!(ship.dates(), Some((d(2024, 6, 13), d(2024, 6, 13))));
        assert_eq!(ship.description, None);

        assert!(payload.events[1].event_blocks.is_empty());
    }

    #[test]
    fn missing_or_null_events_is_empty() {
        let payload: EventsPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.events.is_empty());
        let payload: EventsPayload = serde_json::from_str(r#"{"events": null}"#).unwrap();
        assert!(payload.events.is_empty());
    }

    #[test]
    fn unreadable_dates_become_none() {
        let json = r#"{"id": 3, "name": "Broken", "start_date": "soon", "end_date": null}"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.start_date, None);
        assert_eq!(block.end_date, None);
        assert_eq!(block.dates(), None);
    }

    #[test]
    fn parse_api_date_formats() {
        assert_eq!(parse_api_date("2024-02-29"), Some(d(2024, 2, 29)));
        assert_eq!(parse_api_date("2024-02-29T23:59:59.123"), Some(d(2024, 2, 29)));
        assert_eq!(parse_api_date("2024-02-29 08:00:00"), Some(d(2024, 2, 29)));
        assert!(parse_api_date("2024-02-29T12:00:00+00:00").is_some());
        assert_eq!(parse_api_date("29/02/2024"), None);
    }
}
