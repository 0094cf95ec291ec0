use crate::application::bootstrap::bootstrap_workspace;
use crate::application::event_form::EventForm;
use crate::domain::models::{BaseEvent, Calendar};
use crate::infrastructure::base_event_repository::{
    BaseEventRepository, SqliteBaseEventRepository,
};
use crate::infrastructure::config::{load_config, save_default_calendar_id, AppConfig};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::google_calendar_client::{CalendarProvider, GoogleCalendarProvider};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    let sequence = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{sequence}", Utc::now().timestamp_micros())
}

pub struct AppState {
    config_dir: PathBuf,
    logs_dir: PathBuf,
    config: RwLock<AppConfig>,
    base_events: Arc<dyn BaseEventRepository>,
    base_events_guard: Mutex<()>,
    log_guard: Mutex<()>,
}

impl AppState {
    pub fn new(workspace_root: PathBuf) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let repository = SqliteBaseEventRepository::new(&bootstrap.database_path);
        Self::with_repository(workspace_root, Arc::new(repository))
    }

    pub fn with_repository(
        workspace_root: PathBuf,
        base_events: Arc<dyn BaseEventRepository>,
    ) -> Result<Self, InfraError> {
        let config_dir = workspace_root.join("config");
        let logs_dir = workspace_root.join("logs");
        let config = load_config(&config_dir)?;

        Ok(Self {
            config_dir,
            logs_dir,
            config: RwLock::new(config),
            base_events,
            base_events_guard: Mutex::new(()),
            log_guard: Mutex::new(()),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config(&self) -> AppConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn command_error(&self, command: &str, error: &InfraError) -> String {
        self.log_error(command, &error.to_string());
        error.to_string()
    }

    pub fn log_info(&self, command: &str, message: &str) {
        tracing::info!(command, message, "command");
        self.append_log("info", command, message);
    }

    pub fn log_error(&self, command: &str, message: &str) {
        tracing::warn!(command, message, "command failed");
        self.append_log("error", command, message);
    }

    fn append_log(&self, level: &str, command: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let path = self.logs_dir.join("commands.log");
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "command": command,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", payload);
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateInstanceResponse {
    pub event_id: String,
    pub title: String,
    pub calendar_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Google provider for `access_token`, sending events in the configured zone.
pub fn google_provider_impl(
    state: &AppState,
    access_token: &str,
) -> Result<GoogleCalendarProvider, InfraError> {
    Ok(GoogleCalendarProvider::new(access_token, state.config().timezone))
}

pub fn set_default_calendar_impl(state: &AppState, calendar_id: &str) -> Result<(), InfraError> {
    save_default_calendar_id(&state.config_dir, calendar_id)?;
    let reloaded = load_config(&state.config_dir)?;
    match state.config.write() {
        Ok(mut config) => *config = reloaded,
        Err(poisoned) => *poisoned.into_inner() = reloaded,
    }
    state.log_info(
        "set_default_calendar",
        &format!("default calendar_id={}", calendar_id.trim()),
    );
    Ok(())
}

pub fn list_base_events_impl(state: &AppState) -> Result<Vec<BaseEvent>, InfraError> {
    state.base_events.load()
}

/// Opens a form for a new base event, or prefilled from `event_id`.
pub fn open_event_form_impl(
    state: &AppState,
    calendars: &[Calendar],
    event_id: Option<&str>,
) -> Result<EventForm, InfraError> {
    let config = state.config();
    let default_calendar_id = config.default_calendar_id.as_deref();
    let now = Utc::now();
    match event_id {
        None => Ok(EventForm::blank(
            calendars,
            default_calendar_id,
            config.default_duration_minutes,
            now,
        )),
        Some(event_id) => {
            let event = find_base_event(&state.base_events.load()?, event_id)?;
            Ok(EventForm::from_base_event(
                &event,
                calendars,
                default_calendar_id,
                now,
            ))
        }
    }
}

pub fn add_base_event_impl(
    state: &AppState,
    form: &mut EventForm,
) -> Result<BaseEvent, InfraError> {
    let event = form
        .submit_base_event(next_id("evt"))
        .map_err(|error| InfraError::InvalidInput(error.to_string()))?;

    let _guard = lock_base_events(state)?;
    let mut events = state.base_events.load()?;
    events.push(event.clone());
    state.base_events.save(&events)?;

    state.log_info(
        "add_base_event",
        &format!(
            "added event_id={} duration_minutes={}",
            event.id, event.duration_minutes
        ),
    );
    Ok(event)
}

pub fn update_base_event_impl(
    state: &AppState,
    event_id: &str,
    form: &mut EventForm,
) -> Result<BaseEvent, InfraError> {
    let _guard = lock_base_events(state)?;
    let mut events = state.base_events.load()?;
    let position = events
        .iter()
        .position(|event| event.id == event_id)
        .ok_or_else(|| InfraError::NotFound(format!("base event not found: {event_id}")))?;

    let updated = form
        .submit_base_event(event_id)
        .map_err(|error| InfraError::InvalidInput(error.to_string()))?;
    events[position] = updated.clone();
    state.base_events.save(&events)?;

    state.log_info(
        "update_base_event",
        &format!(
            "updated event_id={event_id} duration_minutes={}",
            updated.duration_minutes
        ),
    );
    Ok(updated)
}

pub fn delete_base_event_impl(state: &AppState, event_id: &str) -> Result<bool, InfraError> {
    let _guard = lock_base_events(state)?;
    let mut events = state.base_events.load()?;
    let before = events.len();
    events.retain(|event| event.id != event_id);
    if events.len() == before {
        return Ok(false);
    }
    state.base_events.save(&events)?;
    state.log_info("delete_base_event", &format!("deleted event_id={event_id}"));
    Ok(true)
}

pub async fn list_calendars_impl<P>(
    state: &AppState,
    provider: &P,
) -> Result<Vec<Calendar>, InfraError>
where
    P: CalendarProvider + ?Sized,
{
    let calendars = with_provider_timeout(state, provider.list_calendars()).await?;
    state.log_info(
        "list_calendars",
        &format!("listed calendars count={}", calendars.len()),
    );
    Ok(calendars)
}

/// Validates the form and writes the resulting instance to the calendar.
pub async fn create_event_instance_impl<P>(
    state: &AppState,
    provider: &P,
    form: &mut EventForm,
) -> Result<CreateInstanceResponse, InfraError>
where
    P: CalendarProvider + ?Sized,
{
    let instance = form
        .submit_instance()
        .map_err(|error| InfraError::InvalidInput(error.to_string()))?;
    instance.validate().map_err(InfraError::InvalidInput)?;

    let title = instance.title();
    let save = provider.save_event(
        &title,
        &instance.calendar_id,
        instance.start_time,
        instance.end_time,
    );
    let event_id = with_provider_timeout(state, save).await?;

    state.log_info(
        "create_event_instance",
        &format!(
            "created event_id={event_id} calendar_id={} start={} end={}",
            instance.calendar_id,
            instance.start_time.to_rfc3339(),
            instance.end_time.to_rfc3339()
        ),
    );
    Ok(CreateInstanceResponse {
        event_id,
        title,
        calendar_id: instance.calendar_id,
        start_time: instance.start_time,
        end_time: instance.end_time,
    })
}

async fn with_provider_timeout<T, F>(state: &AppState, call: F) -> Result<T, InfraError>
where
    F: std::future::Future<Output = Result<T, InfraError>>,
{
    let seconds = state.config().provider_timeout_seconds;
    tokio::time::timeout(Duration::from_secs(seconds), call)
        .await
        .map_err(|_| InfraError::ProviderTimeout(seconds))?
}

fn lock_base_events(state: &AppState) -> Result<MutexGuard<'_, ()>, InfraError> {
    state
        .base_events_guard
        .lock()
        .map_err(|error| InfraError::InvalidConfig(format!("base event lock poisoned: {error}")))
}

fn find_base_event(events: &[BaseEvent], event_id: &str) -> Result<BaseEvent, InfraError> {
    events
        .iter()
        .find(|event| event.id == event_id)
        .cloned()
        .ok_or_else(|| InfraError::NotFound(format!("base event not found: {event_id}")))
}
