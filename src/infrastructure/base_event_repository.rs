use crate::domain::models::BaseEvent;
use crate::infrastructure::error::InfraError;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

pub fn initialize_database(path: &Path) -> Result<(), InfraError> {
    let connection = Connection::open(path)?;
    connection.execute_batch(SCHEMA_SQL)?;
    tracing::debug!(path = %path.display(), "database schema applied");
    Ok(())
}

/// Persists the user's base event list as a whole.
pub trait BaseEventRepository: Send + Sync {
    fn load(&self) -> Result<Vec<BaseEvent>, InfraError>;
    fn save(&self, events: &[BaseEvent]) -> Result<(), InfraError>;
}

#[derive(Debug, Clone)]
pub struct SqliteBaseEventRepository {
    db_path: PathBuf,
}

impl SqliteBaseEventRepository {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, InfraError> {
        Connection::open(&self.db_path).map_err(InfraError::from)
    }
}

impl BaseEventRepository for SqliteBaseEventRepository {
    fn load(&self) -> Result<Vec<BaseEvent>, InfraError> {
        let connection = self.connect()?;
        let mut statement = connection.prepare(
            "SELECT id, name, location, duration_minutes, calendar_id
             FROM base_events
             ORDER BY position ASC",
        )?;
        let rows = statement.query_map([], |row| {
            Ok(BaseEvent {
                id: row.get(0)?,
                name: row.get(1)?,
                location: row.get(2)?,
                duration_minutes: row.get(3)?,
                calendar_id: row.get(4)?,
            })
        })?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    fn save(&self, events: &[BaseEvent]) -> Result<(), InfraError> {
        for event in events {
            event.validate().map_err(InfraError::InvalidInput)?;
        }

        let mut connection = self.connect()?;
        let transaction = connection.transaction()?;
        transaction.execute("DELETE FROM base_events", [])?;
        {
            let mut insert = transaction.prepare(
                "INSERT INTO base_events
                 (id, position, name, location, duration_minutes, calendar_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, event) in events.iter().enumerate() {
                insert.execute(params![
                    event.id,
                    position as i64,
                    event.name,
                    event.location,
                    event.duration_minutes,
                    event.calendar_id,
                ])?;
            }
        }
        transaction.commit()?;
        tracing::debug!(count = events.len(), "base events saved");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBaseEventRepository {
    events: Mutex<Vec<BaseEvent>>,
}

impl InMemoryBaseEventRepository {
    pub fn with_events(events: Vec<BaseEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }
}

impl BaseEventRepository for InMemoryBaseEventRepository {
    fn load(&self) -> Result<Vec<BaseEvent>, InfraError> {
        let events = self
            .events
            .lock()
            .map_err(|error| {
                InfraError::InvalidConfig(format!("base event lock poisoned: {error}"))
            })?;
        Ok(events.clone())
    }

    fn save(&self, events: &[BaseEvent]) -> Result<(), InfraError> {
        for event in events {
            event.validate().map_err(InfraError::InvalidInput)?;
        }
        let mut stored = self
            .events
            .lock()
            .map_err(|error| {
                InfraError::InvalidConfig(format!("base event lock poisoned: {error}"))
            })?;
        *stored = events.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::default_base_events;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_ID: AtomicUsize = AtomicUsize::new(0);

    struct TempDatabase {
        dir: PathBuf,
    }

    impl TempDatabase {
        fn new() -> Self {
            let sequence = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
            let dir = std::env::temp_dir().join(format!(
                "calendarinator-db-{}-{}-{}",
                std::process::id(),
                chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0),
                sequence
            ));
            fs::create_dir_all(&dir).expect("create temp directory");
            initialize_database(&dir.join("test.sqlite")).expect("initialize database");
            Self { dir }
        }

        fn repository(&self) -> SqliteBaseEventRepository {
            SqliteBaseEventRepository::new(self.dir.join("test.sqlite"))
        }
    }

    impl Drop for TempDatabase {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    #[test]
    fn sqlite_load_returns_empty_list_initially() {
        let database = TempDatabase::new();
        let events = database.repository().load().expect("load events");
        assert!(events.is_empty());
    }

    #[test]
    fn sqlite_save_then_load_preserves_order_and_fields() {
        let database = TempDatabase::new();
        let repository = database.repository();
        let mut events = default_base_events("cal-1");
        events.reverse();

        repository.save(&events).expect("save events");
        let loaded = repository.load().expect("load events");
        assert_eq!(loaded, events);
    }

    #[test]
    fn sqlite_save_replaces_previous_list() {
        let database = TempDatabase::new();
        let repository = database.repository();
        repository
            .save(&default_base_events("cal-1"))
            .expect("save defaults");

        let remaining = vec![default_base_events("cal-2").remove(1)];
        repository.save(&remaining).expect("save remaining");
        assert_eq!(repository.load().expect("load events"), remaining);
    }

    #[test]
    fn invalid_events_are_not_persisted() {
        let database = TempDatabase::new();
        let repository = database.repository();
        let mut events = default_base_events("cal-1");
        events[0].duration_minutes = 0;

        let result = repository.save(&events);
        assert!(matches!(result, Err(InfraError::InvalidInput(_))));
        assert!(repository.load().expect("load events").is_empty());
    }

    #[test]
    fn in_memory_repository_round_trips_list() {
        let repository = InMemoryBaseEventRepository::default();
        let events = default_base_events("cal-1");
        repository.save(&events).expect("save events");
        assert_eq!(repository.load().expect("load events"), events);
    }
}
