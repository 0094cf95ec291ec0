use crate::domain::duration::{hours_text_to_minutes, is_partial_decimal, DURATION_REQUIRED};
use crate::domain::models::{primary_calendar_id, BaseEvent, Calendar, EventInstance};
use crate::domain::reconciler::TimeReconciler;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("name is required")]
    MissingName,
    #[error("{0}")]
    InvalidDuration(String),
    #[error("no calendar selected")]
    MissingCalendar,
    #[error("Duration is too long")]
    DurationOutOfRange,
}

/// One open create/edit surface: the text fields plus the time triple.
#[derive(Debug, Clone)]
pub struct EventForm {
    name: String,
    location: String,
    selected_calendar_id: String,
    times: TimeReconciler,
}

impl EventForm {
    /// Form for a brand new base event.
    pub fn blank(
        calendars: &[Calendar],
        default_calendar_id: Option<&str>,
        seed_minutes: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: String::new(),
            location: String::new(),
            selected_calendar_id: initial_calendar_id(None, default_calendar_id, calendars),
            times: TimeReconciler::new(seed_minutes, now),
        }
    }

    /// Form prefilled from an existing base event, for editing or instantiating it.
    pub fn from_base_event(
        event: &BaseEvent,
        calendars: &[Calendar],
        default_calendar_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: event.name.clone(),
            location: event.location.clone().unwrap_or_default(),
            selected_calendar_id: initial_calendar_id(
                Some(&event.calendar_id),
                default_calendar_id,
                calendars,
            ),
            times: TimeReconciler::new(event.duration_minutes, now),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn selected_calendar_id(&self) -> &str {
        &self.selected_calendar_id
    }

    pub fn times(&self) -> &TimeReconciler {
        &self.times
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn select_calendar(&mut self, calendar_id: impl Into<String>) {
        self.selected_calendar_id = calendar_id.into();
    }

    pub fn set_start_time(&mut self, time: DateTime<Utc>) {
        self.times.set_start_time(time);
    }

    pub fn set_end_time(&mut self, time: DateTime<Utc>) {
        self.times.set_end_time(time);
    }

    pub fn set_duration(&mut self, text: &str) {
        self.times.set_duration(text);
        if text.is_empty() {
            self.times.set_duration_error(Some(DURATION_REQUIRED.to_string()));
        }
    }

    /// Whether the submit action should be enabled.
    pub fn is_form_valid(&self) -> bool {
        let duration = self.times.duration();
        !self.name.trim().is_empty()
            && self.times.duration_error().is_none()
            && !duration.is_empty()
            && !is_partial_decimal(duration)
    }

    pub fn validate_form(&mut self) -> bool {
        self.times.validate_form()
    }

    pub fn submit_instance(&mut self) -> Result<EventInstance, FormError> {
        let duration_minutes = self.checked_duration_minutes()?;
        if self.selected_calendar_id.trim().is_empty() {
            return Err(FormError::MissingCalendar);
        }
        Ok(EventInstance {
            name: self.name.trim().to_string(),
            location: self.location_value(),
            duration_minutes,
            calendar_id: self.selected_calendar_id.clone(),
            start_time: self.times.start_time(),
            end_time: self.times.end_time(),
        })
    }

    pub fn submit_base_event(&mut self, id: impl Into<String>) -> Result<BaseEvent, FormError> {
        let duration_minutes = self.checked_duration_minutes()?;
        Ok(BaseEvent {
            id: id.into(),
            name: self.name.trim().to_string(),
            location: self.location_value(),
            duration_minutes,
            calendar_id: self.selected_calendar_id.clone(),
        })
    }

    fn checked_duration_minutes(&mut self) -> Result<u32, FormError> {
        let duration_is_valid = self.validate_form();
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        if !duration_is_valid || !self.is_form_valid() {
            return Err(FormError::InvalidDuration(self.duration_error_message()));
        }
        hours_text_to_minutes(self.times.duration()).ok_or(FormError::DurationOutOfRange)
    }

    fn duration_error_message(&self) -> String {
        self.times
            .duration_error()
            .unwrap_or("Please finish entering the duration")
            .to_string()
    }

    fn location_value(&self) -> Option<String> {
        let location = self.location.trim();
        if location.is_empty() {
            None
        } else {
            Some(location.to_string())
        }
    }
}

fn initial_calendar_id(
    event_calendar_id: Option<&str>,
    default_calendar_id: Option<&str>,
    calendars: &[Calendar],
) -> String {
    event_calendar_id
        .or(default_calendar_id)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| primary_calendar_id(calendars))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::duration::DURATION_INVALID;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn nine() -> DateTime<Utc> {
        fixed_time("2026-03-02T09:00:00Z")
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
            calendar_id: "cal-work".to_string(),
        }
    }

    fn gym_form() -> EventForm {
        EventForm::from_base_event(&sample_base_event(), &sample_calendars(), None, nine())
    }

    #[test]
    fn blank_form_selects_primary_calendar_and_default_seed() {
        let form = EventForm::blank(&sample_calendars(), None, 60, nine());
        assert_eq!(form.selected_calendar_id(), "cal-personal");
        assert_eq!(form.times().duration(), "1");
        assert_eq!(form.times().end_time(), fixed_time("2026-03-02T10:00:00Z"));
        assert!(!form.is_form_valid());
    }

    #[test]
    fn configured_default_calendar_wins_over_primary() {
        let form = EventForm::blank(&sample_calendars(), Some("cal-work"), 60, nine());
        assert_eq!(form.selected_calendar_id(), "cal-work");

        let form = EventForm::blank(&[], None, 60, nine());
        assert_eq!(form.selected_calendar_id(), "");
    }

    #[test]
    fn base_event_seeds_fields_and_duration() {
        let form = gym_form();
        assert_eq!(form.name(), "Gym");
        assert_eq!(form.location(), "Downtown");
        assert_eq!(form.selected_calendar_id(), "cal-work");
        assert_eq!(form.times().duration(), "1.5");
        assert_eq!(form.times().end_time(), fixed_time("2026-03-02T10:30:00Z"));
        assert!(form.is_form_valid());
    }

    #[test]
    fn empty_duration_is_required_and_blocks_submit() {
        let mut form = gym_form();
        form.set_duration("");
        assert_eq!(form.times().duration_error(), Some(DURATION_REQUIRED));
        assert!(!form.is_form_valid());
        assert_eq!(
            form.submit_instance(),
            Err(FormError::InvalidDuration(DURATION_REQUIRED.to_string()))
        );
    }

    #[test]
    fn partial_duration_blocks_submit_without_error() {
        let mut form = gym_form();
        form.set_duration("2.");
        assert_eq!(form.times().duration_error(), None);
        assert!(!form.is_form_valid());
        assert!(matches!(
            form.submit_instance(),
            Err(FormError::InvalidDuration(_))
        ));
    }

    #[test]
    fn invalid_duration_message_is_reported() {
        let mut form = gym_form();
        form.set_duration("abc");
        assert_eq!(
            form.submit_base_event("evt-1"),
            Err(FormError::InvalidDuration(DURATION_INVALID.to_string()))
        );
    }

    #[test]
    fn submit_instance_rounds_duration_and_uses_triple() {
        let mut form = gym_form();
        form.set_duration("1.33");
        let instance = form.submit_instance().expect("submit instance");

        assert_eq!(form.times().duration(), "1.25");
        assert_eq!(instance.duration_minutes, 75);
        assert_eq!(instance.start_time, nine());
        assert_eq!(instance.end_time, fixed_time("2026-03-02T10:30:00Z"));
        assert_eq!(instance.title(), "Gym @ Downtown");
        assert_eq!(instance.calendar_id, "cal-work");
    }

    #[test]
    fn submit_instance_after_end_time_pick() {
        let mut form = gym_form();
        form.set_start_time(fixed_time("2026-03-02T13:00:00Z"));
        form.set_end_time(fixed_time("2026-03-02T13:45:00Z"));
        assert_eq!(form.times().duration(), "0.75");

        let instance = form.submit_instance().expect("submit instance");
        assert_eq!(instance.duration_minutes, 45);
        assert_eq!(instance.end_time, fixed_time("2026-03-02T13:45:00Z"));
    }

    #[test]
    fn oversized_duration_is_out_of_range() {
        let mut form = gym_form();
        form.set_duration("100000000");
        assert_eq!(form.submit_instance(), Err(FormError::DurationOutOfRange));
        assert_eq!(
            form.submit_base_event("evt-1"),
            Err(FormError::DurationOutOfRange)
        );
    }

    #[test]
    fn submit_requires_name_and_calendar() {
        let mut form = EventForm::blank(&[], None, 60, nine());
        assert_eq!(form.submit_base_event("evt-2"), Err(FormError::MissingName));

        form.set_name("Reading");
        assert_eq!(form.submit_instance(), Err(FormError::MissingCalendar));

        let event = form.submit_base_event("evt-2").expect("base event without calendar");
        assert_eq!(event.duration_minutes, 60);
        assert_eq!(event.location, None);
    }
}
