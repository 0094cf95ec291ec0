use crate::domain::reconciler::DEFAULT_DURATION_MINUTES;
use crate::infrastructure::error::InfraError;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const CALENDARS_JSON: &str = "calendars.json";
const SUPPORTED_SCHEMA: u64 = 1;
const DEFAULT_PROVIDER_TIMEOUT_SECONDS: u64 = 30;

/// Typed view over the JSON config files of a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub timezone: Option<String>,
    pub default_duration_minutes: u32,
    pub provider_timeout_seconds: u64,
    pub default_calendar_id: Option<String>,
}

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([
        (
            APP_JSON,
            serde_json::json!({
                "schema": 1,
                "timezone": "UTC",
                "defaultDurationMinutes": DEFAULT_DURATION_MINUTES,
                "providerTimeoutSeconds": DEFAULT_PROVIDER_TIMEOUT_SECONDS
            }),
        ),
        (
            CALENDARS_JSON,
            serde_json::json!({
                "schema": 1,
                "defaultCalendarId": null
            }),
        ),
    ])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(&path, format!("{formatted}\n"))?;
            tracing::info!(path = %path.display(), "wrote default config");
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != SUPPORTED_SCHEMA {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

fn non_empty_str<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub fn load_config(config_dir: &Path) -> Result<AppConfig, InfraError> {
    let app_path = config_dir.join(APP_JSON);
    let app = read_config(&app_path)?;
    let calendars = read_config(&config_dir.join(CALENDARS_JSON))?;

    let default_duration_minutes = match app.get("defaultDurationMinutes") {
        None | Some(serde_json::Value::Null) => DEFAULT_DURATION_MINUTES,
        Some(value) => value
            .as_u64()
            .and_then(|minutes| u32::try_from(minutes).ok())
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| {
                InfraError::InvalidConfig(format!(
                    "defaultDurationMinutes must be a positive integer in {}",
                    app_path.display()
                ))
            })?,
    };

    let provider_timeout_seconds = app
        .get("providerTimeoutSeconds")
        .and_then(serde_json::Value::as_u64)
        .filter(|seconds| *seconds > 0)
        .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECONDS);

    Ok(AppConfig {
        timezone: parse_timezone(&app)?,
        default_duration_minutes,
        provider_timeout_seconds,
        default_calendar_id: non_empty_str(&calendars, "defaultCalendarId")
            .map(ToOwned::to_owned),
    })
}

/// Configured IANA zone name; rejected unless `chrono-tz` knows it.
fn parse_timezone(app: &serde_json::Value) -> Result<Option<String>, InfraError> {
    let Some(name) = non_empty_str(app, "timezone") else {
        return Ok(None);
    };
    let zone: Tz = name
        .parse()
        .map_err(|_| InfraError::InvalidConfig(format!("unknown timezone '{name}'")))?;
    Ok(Some(zone.name().to_string()))
}

pub fn save_default_calendar_id(config_dir: &Path, calendar_id: &str) -> Result<(), InfraError> {
    let calendar_id = calendar_id.trim();
    if calendar_id.is_empty() {
        return Err(InfraError::InvalidConfig(
            "defaultCalendarId must not be empty".to_string(),
        ));
    }

    let path = config_dir.join(CALENDARS_JSON);
    let mut calendars = read_config(&path)?;
    let object = calendars.as_object_mut().ok_or_else(|| {
        InfraError::InvalidConfig(format!("invalid object structure in {}", path.display()))
    })?;
    object.insert(
        "defaultCalendarId".to_string(),
        serde_json::Value::String(calendar_id.to_string()),
    );

    let formatted = serde_json::to_string_pretty(&calendars)?;
    fs::write(path, format!("{formatted}\n"))?;
    Ok(())
}
