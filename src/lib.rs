pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bootstrap::{bootstrap_workspace, BootstrapResult};
pub use application::commands::{
    add_base_event_impl, create_event_instance_impl, delete_base_event_impl,
    google_provider_impl, list_base_events_impl, list_calendars_impl, open_event_form_impl,
    set_default_calendar_impl, update_base_event_impl, AppState, CreateInstanceResponse,
};
pub use application::event_form::{EventForm, FormError};
pub use domain::duration::{validate_duration, DurationValidation};
pub use domain::models::{calendar_name, BaseEvent, Calendar, EventInstance};
pub use domain::reconciler::TimeReconciler;
pub use domain::time::{end_time_for, quarter_hour_options, round_up_to_quarter_hour};
pub use infrastructure::error::InfraError;
pub use infrastructure::google_calendar_client::{CalendarProvider, GoogleCalendarProvider};

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    pub workspace_root: String,
    pub database_path: String,
    pub seeded_defaults: bool,
}

pub fn bootstrap(root: Option<String>) -> Result<BootstrapResponse, String> {
    let workspace_root = match root {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().map_err(|error| error.to_string())?,
    };

    let result = bootstrap_workspace(&workspace_root).map_err(|error| error.to_string())?;
    Ok(BootstrapResponse {
        workspace_root: result.workspace_root.display().to_string(),
        database_path: result.database_path.display().to_string(),
        seeded_defaults: result.seeded_defaults,
    })
}

pub fn list_base_events(state: &AppState) -> Result<Vec<BaseEvent>, String> {
    list_base_events_impl(state).map_err(|error| state.command_error("list_base_events", &error))
}

pub fn add_base_event(state: &AppState, form: &mut EventForm) -> Result<BaseEvent, String> {
    add_base_event_impl(state, form).map_err(|error| state.command_error("add_base_event", &error))
}

pub fn update_base_event(
    state: &AppState,
    event_id: String,
    form: &mut EventForm,
) -> Result<BaseEvent, String> {
    update_base_event_impl(state, &event_id, form)
        .map_err(|error| state.command_error("update_base_event", &error))
}

pub fn delete_base_event(state: &AppState, event_id: String) -> Result<bool, String> {
    delete_base_event_impl(state, &event_id)
        .map_err(|error| state.command_error("delete_base_event", &error))
}

pub fn set_default_calendar(state: &AppState, calendar_id: String) -> Result<(), String> {
    set_default_calendar_impl(state, &calendar_id)
        .map_err(|error| state.command_error("set_default_calendar", &error))
}

pub async fn list_calendars(
    state: &AppState,
    access_token: String,
) -> Result<Vec<Calendar>, String> {
    let result = match google_provider_impl(state, &access_token) {
        Ok(provider) => list_calendars_impl(state, &provider).await,
        Err(error) => Err(error),
    };
    result.map_err(|error| state.command_error("list_calendars", &error))
}

pub async fn create_event_instance(
    state: &AppState,
    access_token: String,
    form: &mut EventForm,
) -> Result<CreateInstanceResponse, String> {
    let result = match google_provider_impl(state, &access_token) {
        Ok(provider) => create_event_instance_impl(state, &provider, form).await,
        Err(error) => Err(error),
    };
    result.map_err(|error| state.command_error("create_event_instance", &error))
}
