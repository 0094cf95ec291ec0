use crate::domain::duration::{
    is_partial_decimal, minutes_to_hours_text, parse_positive_hours, validate_duration,
};
use crate::domain::time::{elapsed_minutes, end_time_for, round_up_to_quarter_hour};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Keeps a start time, an end time and a duration consistent with each other.
///
/// Start time is the anchor: editing it or the duration derives the end time,
/// editing the end time derives the duration. The duration is kept as the raw
/// text of the input field so partially typed numbers survive between edits.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TimeReconciler {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    duration: String,
    duration_error: Option<String>,
}

impl TimeReconciler {
    pub fn new(seed_minutes: u32, now: DateTime<Utc>) -> Self {
        let start_time = round_up_to_quarter_hour(now);
        let end_time = end_time_for(start_time, f64::from(seed_minutes)).unwrap_or(start_time);
        Self {
            start_time,
            end_time,
            duration: minutes_to_hours_text(seed_minutes),
            duration_error: None,
        }
    }

    pub fn starting_now(seed_minutes: Option<u32>) -> Self {
        Self::new(seed_minutes.unwrap_or(DEFAULT_DURATION_MINUTES), Utc::now())
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn duration_error(&self) -> Option<&str> {
        self.duration_error.as_deref()
    }

    pub fn set_start_time(&mut self, time: DateTime<Utc>) {
        self.start_time = time;
        if let Some(hours) = parse_positive_hours(&self.duration) {
            self.derive_end_time(hours);
        }
    }

    /// Takes the picked end time as is and rewrites the duration from it.
    ///
    /// The quarter-hour rule is not checked here; `validate_form` does that
    /// before anything is submitted.
    pub fn set_end_time(&mut self, time: DateTime<Utc>) {
        self.end_time = time;
        let minutes = elapsed_minutes(self.start_time, time);
        // Half-hundredths round away from zero, so 7m30s reads "0.13".
        let hours = (minutes / 60.0 * 100.0).round() / 100.0;
        self.duration = format!("{hours:.2}");
        tracing::debug!(minutes, duration = %self.duration, "duration derived from end time");
    }

    pub fn set_duration(&mut self, text: &str) {
        let validation = validate_duration(text);
        self.duration_error = validation.error;
        self.duration = text.to_string();

        if text.trim().is_empty() || is_partial_decimal(text) {
            return;
        }
        if let Some(hours) = parse_positive_hours(text) {
            self.derive_end_time(hours);
        }
    }

    /// Normalizes the duration to its canonical quarter-hour value.
    pub fn validate_form(&mut self) -> bool {
        let validation = validate_duration(&self.duration);
        self.duration = validation.formatted_value;
        self.duration_error = validation.error;
        validation.is_valid
    }

    pub fn set_duration_error(&mut self, error: Option<String>) {
        self.duration_error = error;
    }

    fn derive_end_time(&mut self, hours: f64) {
        match end_time_for(self.start_time, hours * 60.0) {
            Some(end_time) => {
                tracing::debug!(hours, end_time = %end_time, "end time derived from duration");
                self.end_time = end_time;
            }
            None => tracing::debug!(hours, "duration out of range, end time kept"),
        }
    }
}
