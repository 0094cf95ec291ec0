use serde::Serialize;

pub const DURATION_REQUIRED: &str = "Duration is required";
pub const DURATION_INVALID: &str = "Please enter a valid duration";
pub const DURATION_NOT_QUARTER_HOUR: &str = "Duration must be in 15-minute increments";

const QUARTERS_PER_HOUR: f64 = 4.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const INCREMENT_MINUTES: f64 = 15.0;

/// Outcome of checking a duration field, expressed in hours.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DurationValidation {
    pub is_valid: bool,
    pub formatted_value: String,
    pub error: Option<String>,
}

impl DurationValidation {
    fn valid(formatted_value: String) -> Self {
        Self {
            is_valid: true,
            formatted_value,
            error: None,
        }
    }

    fn invalid(formatted_value: String, error: &str) -> Self {
        Self {
            is_valid: false,
            formatted_value,
            error: Some(error.to_string()),
        }
    }
}

/// Validates and normalizes duration text typed in hours.
///
/// Text ending in a decimal point is an edit in progress and is accepted as is,
/// except for a lone `"."`. Complete numbers are rounded to the nearest quarter
/// hour and rendered as their shortest decimal form (`"2"`, `"1.5"`, `"1.25"`).
pub fn validate_duration(text: &str) -> DurationValidation {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return DurationValidation::invalid(String::new(), DURATION_REQUIRED);
    }

    if is_partial_decimal(text) {
        return DurationValidation::valid(text.to_string());
    }

    let Some(hours) = parse_positive_hours(text) else {
        return DurationValidation::invalid(text.to_string(), DURATION_INVALID);
    };

    let rounded = round_to_quarter_hour(hours);
    let formatted = format_hours(rounded);
    if rounded <= 0.0 {
        return DurationValidation::invalid(formatted, DURATION_INVALID);
    }
    if !is_quarter_hour_multiple(rounded) {
        return DurationValidation::invalid(formatted, DURATION_NOT_QUARTER_HOUR);
    }

    DurationValidation::valid(formatted)
}

/// True while the user is still typing the fractional part, e.g. `"2."`.
pub fn is_partial_decimal(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.ends_with('.') && trimmed != "."
}

/// Parses duration text as a finite, strictly positive number of hours.
pub fn parse_positive_hours(text: &str) -> Option<f64> {
    let hours = text.trim().parse::<f64>().ok()?;
    if hours.is_finite() && hours > 0.0 {
        Some(hours)
    } else {
        None
    }
}

pub fn round_to_quarter_hour(hours: f64) -> f64 {
    (hours * QUARTERS_PER_HOUR).round() / QUARTERS_PER_HOUR
}

fn is_quarter_hour_multiple(hours: f64) -> bool {
    (hours * MINUTES_PER_HOUR) % INCREMENT_MINUTES == 0.0
}

/// Renders hours the way they are shown in the duration field.
pub fn format_hours(hours: f64) -> String {
    format!("{hours}")
}

/// Minutes represented by a seed duration, as duration field text.
pub fn minutes_to_hours_text(minutes: u32) -> String {
    format_hours(f64::from(minutes) / MINUTES_PER_HOUR)
}

/// Whole minutes for duration text, rounded to the nearest minute.
pub fn hours_text_to_minutes(text: &str) -> Option<u32> {
    let hours = parse_positive_hours(text)?;
    let minutes = (hours * MINUTES_PER_HOUR).round();
    if minutes > f64::from(u32::MAX) {
        return None;
    }
    Some(minutes as u32)
}
