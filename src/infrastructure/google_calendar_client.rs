use crate::domain::models::Calendar;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::event_mapper::{
    created_event_id, decode_calendar, encode_instance_event, CalendarListItem,
    GoogleCalendarEvent,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use url::Url;

const CALENDAR_LIST_ENDPOINT: &str = "https://www.googleapis.com/calendar/v3/users/me/calendarList";
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

/// Read/write access to the user's calendars.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn list_calendars(&self) -> Result<Vec<Calendar>, InfraError>;

    /// Creates an event and returns its provider id.
    async fn save_event(
        &self,
        title: &str,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<String, InfraError>;
}

/// Google Calendar over REST. Obtaining the access token is the caller's job.
#[derive(Debug, Clone)]
pub struct GoogleCalendarProvider {
    client: Client,
    access_token: String,
    time_zone: Option<String>,
}

impl GoogleCalendarProvider {
    pub fn new(access_token: impl Into<String>, time_zone: Option<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            time_zone,
        }
    }

    pub fn time_zone(&self) -> Option<&str> {
        self.time_zone.as_deref()
    }

    fn ensure_non_empty(value: &str, field: &str) -> Result<(), InfraError> {
        if value.trim().is_empty() {
            return Err(InfraError::InvalidInput(format!("{field} must not be empty")));
        }
        Ok(())
    }

    fn http_error(status: reqwest::StatusCode, body: &str) -> InfraError {
        let message = if body.trim().is_empty() {
            format!("google calendar api error: http {}", status.as_u16())
        } else {
            format!("google calendar api error: http {}; body={body}", status.as_u16())
        };
        InfraError::Calendar(message)
    }

    fn events_endpoint(calendar_id: &str) -> Result<Url, InfraError> {
        let mut url = Url::parse(CALENDAR_API_BASE).map_err(|error| {
            InfraError::Calendar(format!("invalid calendar api base url: {error}"))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                InfraError::Calendar("calendar api base URL cannot be a base".to_string())
            })?;
            segments.push("calendars");
            segments.push(calendar_id);
            segments.push("events");
        }
        Ok(url)
    }
}

#[derive(Debug, serde::Deserialize)]
struct CalendarListResponse {
    items: Option<Vec<CalendarListItem>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn list_calendars(&self) -> Result<Vec<Calendar>, InfraError> {
        Self::ensure_non_empty(&self.access_token, "access token")?;

        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(CALENDAR_LIST_ENDPOINT)
                .query(&[("maxResults", "250")])
                .bearer_auth(&self.access_token);
            if let Some(page_token) = page_token.as_deref() {
                request = request.query(&[("pageToken", page_token)]);
            }

            let response = request.send().await.map_err(|error| {
                InfraError::Calendar(format!("network error while listing calendars: {error}"))
            })?;
            let status = response.status();
            let body = response.text().await.map_err(|error| {
                InfraError::Calendar(format!("failed reading calendar list response: {error}"))
            })?;
            if !status.is_success() {
                return Err(Self::http_error(status, &body));
            }

            let mut parsed: CalendarListResponse = serde_json::from_str(&body).map_err(|error| {
                InfraError::Calendar(format!("invalid calendar list payload: {error}; body={body}"))
            })?;
            calendars.extend(
                parsed
                    .items
                    .take()
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(decode_calendar),
            );

            match parsed.next_page_token.take() {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::info!(count = calendars.len(), "listed calendars");
        Ok(calendars)
    }

    async fn save_event(
        &self,
        title: &str,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<String, InfraError> {
        Self::ensure_non_empty(&self.access_token, "access token")?;
        Self::ensure_non_empty(calendar_id, "calendar id")?;

        let event = encode_instance_event(title, start, end, self.time_zone.as_deref())?;
        let endpoint = Self::events_endpoint(calendar_id)?;
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.access_token)
            .json(&event)
            .send()
            .await
            .map_err(|error| {
                InfraError::Calendar(format!("network error while creating event: {error}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            InfraError::Calendar(format!("failed reading event create response: {error}"))
        })?;
        if !status.is_success() {
            return Err(Self::http_error(status, &body));
        }

        let parsed: GoogleCalendarEvent = serde_json::from_str(&body).map_err(|error| {
            InfraError::Calendar(format!("invalid event create payload: {error}; body={body}"))
        })?;
        created_event_id(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_endpoint_encodes_calendar_id() {
        let url = GoogleCalendarProvider::events_endpoint("team@group.calendar.google.com")
            .expect("build url");
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team@group.calendar.google.com/events"
        );

        let url = GoogleCalendarProvider::events_endpoint("a/b c").expect("build url");
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/a%2Fb%20c/events"
        );
    }

    #[tokio::test]
    async fn blank_access_token_is_rejected_before_any_request() {
        let provider = GoogleCalendarProvider::new("  ", None);
        assert!(matches!(
            provider.list_calendars().await,
            Err(InfraError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn blank_calendar_id_is_rejected_before_any_request() {
        let provider = GoogleCalendarProvider::new("token", None);
        let start = Utc::now();
        let result = provider
            .save_event("Gym", " ", start, start + chrono::Duration::hours(1))
            .await;
        assert!(matches!(result, Err(InfraError::InvalidInput(_))));
    }
}
