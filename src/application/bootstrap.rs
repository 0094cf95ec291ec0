use crate::domain::models::default_base_events;
use crate::infrastructure::base_event_repository::{
    initialize_database, BaseEventRepository, SqliteBaseEventRepository,
};
use crate::infrastructure::config::{ensure_default_configs, load_config};
use crate::infrastructure::error::InfraError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BootstrapResult {
    pub workspace_root: PathBuf,
    pub database_path: PathBuf,
    pub seeded_defaults: bool,
}

pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, InfraError> {
    let config_dir = workspace_root.join("config");
    let state_dir = workspace_root.join("state");
    let logs_dir = workspace_root.join("logs");
    let database_path = state_dir.join("calendarinator.sqlite");

    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&state_dir)?;
    fs::create_dir_all(&logs_dir)?;

    ensure_default_configs(&config_dir)?;
    let config = load_config(&config_dir)?;
    let is_new_database = !database_path.exists();
    initialize_database(&database_path)?;

    // Starter templates go into a fresh database only, so an emptied list stays empty.
    let repository = SqliteBaseEventRepository::new(&database_path);
    let seeded_defaults = is_new_database && repository.load()?.is_empty();
    if seeded_defaults {
        let calendar_id = config.default_calendar_id.unwrap_or_default();
        repository.save(&default_base_events(&calendar_id))?;
    }

    tracing::info!(
        root = %workspace_root.display(),
        seeded_defaults,
        "workspace ready"
    );

    Ok(BootstrapResult {
        workspace_root: workspace_root.to_path_buf(),
        database_path,
        seeded_defaults,
    })
}
