use chrono::{DateTime, Duration, Utc};

const QUARTER_HOUR_SECONDS: i64 = 15 * 60;
const PICKER_STEPS: i64 = 2;

/// Rounds up to the next quarter-hour boundary at minute granularity.
///
/// Seconds are discarded first, so 09:00:45 stays 09:00 while 09:01 becomes
/// 09:15. Instants already on a boundary are returned unchanged.
pub fn round_up_to_quarter_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    let minute_start = time.timestamp().div_euclid(60) * 60;
    let remainder = minute_start.rem_euclid(QUARTER_HOUR_SECONDS);
    let rounded = if remainder == 0 {
        minute_start
    } else {
        minute_start + QUARTER_HOUR_SECONDS - remainder
    };
    DateTime::from_timestamp(rounded, 0).unwrap_or(time)
}

/// End instant for a start plus a duration in (possibly fractional) minutes,
/// rounded up to the next quarter hour. `None` when the result is out of range.
pub fn end_time_for(start: DateTime<Utc>, duration_minutes: f64) -> Option<DateTime<Utc>> {
    let milliseconds = (duration_minutes * 60_000.0).round();
    if !milliseconds.is_finite() || milliseconds.abs() > i64::MAX as f64 {
        return None;
    }
    let offset = Duration::try_milliseconds(milliseconds as i64)?;
    start
        .checked_add_signed(offset)
        .map(round_up_to_quarter_hour)
}

pub fn elapsed_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 60_000.0
}

/// Five picker options: two quarter hours either side of `center`.
pub fn quarter_hour_options(center: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    (-PICKER_STEPS..=PICKER_STEPS)
        .filter_map(|step| center.checked_add_signed(Duration::minutes(step * 15)))
        .collect()
}
