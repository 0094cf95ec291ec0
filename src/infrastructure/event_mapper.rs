use crate::domain::models::Calendar;
use crate::infrastructure::error::InfraError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CalendarEventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct GoogleCalendarEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub start: CalendarEventDateTime,
    pub end: CalendarEventDateTime,
}

#[derive(Debug, Clone, serde::Deserialize, PartialEq, Eq)]
pub struct CalendarListItem {
    pub id: String,
    pub summary: Option<String>,
    #[serde(rename = "summaryOverride")]
    pub summary_override: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

pub fn encode_instance_event(
    title: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    time_zone: Option<&str>,
) -> Result<GoogleCalendarEvent, InfraError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(InfraError::InvalidInput("event title must not be empty".to_string()));
    }
    if end <= start {
        return Err(InfraError::InvalidInput(
            "event end must be after event start".to_string(),
        ));
    }

    let time_zone = time_zone
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    Ok(GoogleCalendarEvent {
        id: None,
        summary: Some(title.to_string()),
        status: Some("confirmed".to_string()),
        start: CalendarEventDateTime {
            date_time: start.to_rfc3339(),
            time_zone: time_zone.clone(),
        },
        end: CalendarEventDateTime {
            date_time: end.to_rfc3339(),
            time_zone,
        },
    })
}

/// Maps a calendar list entry; entries without an id are dropped.
pub fn decode_calendar(item: CalendarListItem) -> Option<Calendar> {
    let id = item.id.trim();
    if id.is_empty() {
        return None;
    }
    let title = item
        .summary_override
        .or(item.summary)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| id.to_string());

    Some(Calendar {
        id: id.to_string(),
        title,
        is_primary: item.primary,
    })
}

pub fn created_event_id(event: GoogleCalendarEvent) -> Result<String, InfraError> {
    event
        .id
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| InfraError::Calendar("event create response did not include id".to_string()))
}
