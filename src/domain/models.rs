use crate::domain::duration::format_hours;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_CALENDAR: &str = "Unknown Calendar";

/// A reusable event template the user instantiates on a calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseEvent {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub duration_minutes: u32,
    pub calendar_id: String,
}

impl BaseEvent {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "base_event.id")?;
        validate_non_empty(&self.name, "base_event.name")?;
        if self.duration_minutes == 0 {
            return Err("base_event.duration_minutes must be > 0".to_string());
        }
        Ok(())
    }

    /// `"Gym @ Downtown"`, or just the name when there is no location.
    pub fn title(&self) -> String {
        event_title(&self.name, self.location.as_deref())
    }

    /// `"Personal - 1.5h"` as shown in the base event list.
    pub fn list_label(&self, calendars: &[Calendar]) -> String {
        format!(
            "{} - {}h",
            calendar_name(&self.calendar_id, calendars),
            format_hours(f64::from(self.duration_minutes) / 60.0)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Calendar {
    pub id: String,
    pub title: String,
    pub is_primary: bool,
}

/// A concrete calendar entry built from a base event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventInstance {
    pub name: String,
    pub location: Option<String>,
    pub duration_minutes: u32,
    pub calendar_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl EventInstance {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.name, "instance.name")?;
        validate_non_empty(&self.calendar_id, "instance.calendar_id")?;
        if self.duration_minutes == 0 {
            return Err("instance.duration_minutes must be > 0".to_string());
        }
        if self.end_time <= self.start_time {
            return Err("instance.end_time must be after instance.start_time".to_string());
        }
        Ok(())
    }

    pub fn title(&self) -> String {
        event_title(&self.name, self.location.as_deref())
    }
}

pub fn event_title(name: &str, location: Option<&str>) -> String {
    match location.map(str::trim).filter(|value| !value.is_empty()) {
        Some(location) => format!("{name} @ {location}"),
        None => name.to_string(),
    }
}

pub fn calendar_name<'a>(calendar_id: &str, calendars: &'a [Calendar]) -> &'a str {
    calendars
        .iter()
        .find(|calendar| calendar.id == calendar_id)
        .map(|calendar| calendar.title.as_str())
        .unwrap_or(UNKNOWN_CALENDAR)
}

pub fn primary_calendar_id(calendars: &[Calendar]) -> Option<&str> {
    calendars
        .iter()
        .find(|calendar| calendar.is_primary)
        .map(|calendar| calendar.id.as_str())
}

/// Templates a fresh workspace starts with.
pub fn default_base_events(calendar_id: &str) -> Vec<BaseEvent> {
    [
        ("Sleep", Some("Home"), 480),
        ("Lunch", Some("Home"), 30),
        ("Gym", None, 60),
        ("Shower", Some("Gym"), 30),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (name, location, duration_minutes))| BaseEvent {
        id: format!("default-{}", index + 1),
        name: name.to_string(),
        location: location.map(ToOwned::to_owned),
        duration_minutes,
        calendar_id: calendar_id.to_string(),
    })
    .collect()
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn sample_calendars() -> Vec<Calendar> {
        vec![
            Calendar {
                id: "cal-work".to_string(),
                title: "Work".to_string(),
                is_primary: false,
            },
            Calendar {
                id: "cal-personal".to_string(),
                title: "Personal".to_string(),
                is_primary: true,
            },
        ]
    }

    fn sample_base_event() -> BaseEvent {
        BaseEvent {
            id: "evt-1".to_string(),
            name: "Gym".to_string(),
            location: Some("Downtown".to_string()),
            duration_minutes: 90,
            calendar_id: "cal-personal".to_string(),
        }
    }

    fn sample_instance() -> EventInstance {
        EventInstance {
            name: "Gym".to_string(),
            location: None,
            duration_minutes: 60,
            calendar_id: "cal-personal".to_string(),
            start_time: fixed_time("2026-03-02T09:00:00Z"),
            end_time: fixed_time("2026-03-02T10:00:00Z"),
        }
    }

    #[test]
    fn base_event_validate_accepts_valid_event() {
        assert!(sample_base_event().validate().is_ok());
    }

    #[test]
    fn base_event_validate_rejects_blank_name_and_zero_duration() {
        let mut event = sample_base_event();
        event.name = "  ".to_string();
        assert_eq!(
            event.validate(),
            Err("base_event.name must not be empty".to_string())
        );

        let mut event = sample_base_event();
        event.duration_minutes = 0;
        assert!(event.validate().is_err());
    }

    #[test]
    fn title_includes_location_only_when_present() {
        let mut event = sample_base_event();
        assert_eq!(event.title(), "Gym @ Downtown");
        event.location = Some("   ".to_string());
        assert_eq!(event.title(), "Gym");
        event.location = None;
        assert_eq!(event.title(), "Gym");
    }

    #[test]
    fn list_label_uses_calendar_title_and_hours() {
        let calendars = sample_calendars();
        let mut event = sample_base_event();
        assert_eq!(event.list_label(&calendars), "Personal - 1.5h");
        event.calendar_id = "missing".to_string();
        event.duration_minutes = 480;
        assert_eq!(event.list_label(&calendars), "Unknown Calendar - 8h");
    }

    #[test]
    fn primary_calendar_is_found() {
        assert_eq!(primary_calendar_id(&sample_calendars()), Some("cal-personal"));
        assert_eq!(primary_calendar_id(&[]), None);
    }

    #[test]
    fn instance_validate_rejects_reverse_time() {
        let mut instance = sample_instance();
        assert!(instance.validate().is_ok());
        instance.end_time = fixed_time("2026-03-02T08:45:00Z");
        assert!(instance.validate().is_err());
    }

    #[test]
    fn default_base_events_cover_the_starter_set() {
        let events = default_base_events("cal-personal");
        let names: Vec<&str> = events.iter().map(|event| event.name.as_str()).collect();
        assert_eq!(names, vec!["Sleep", "Lunch", "Gym", "Shower"]);
        assert!(events.iter().all(|event| event.validate().is_ok()));
        assert_eq!(events[2].location, None);
    }

    #[test]
    fn domain_models_support_serde_roundtrip() {
        let event = sample_base_event();
        let instance = sample_instance();

        let event_roundtrip: BaseEvent =
            serde_json::from_str(&serde_json::to_string(&event).expect("serialize event"))
                .expect("deserialize event");
        let instance_roundtrip: EventInstance = serde_json::from_str(
            &serde_json::to_string(&instance).expect("serialize instance"),
        )
        .expect("deserialize instance");

        assert_eq!(event_roundtrip, event);
        assert_eq!(instance_roundtrip, instance);
    }
}
