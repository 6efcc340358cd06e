use crate::errors::{AppError, AppResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Key under which the active status filter survives across sessions.
pub const STATUS_FILTER_KEY: &str = "dashboard.statusFilter";

/// Cross-session key-value store for user preferences.
pub trait PreferenceStore: Send + Sync {
    fn get_preference(&self, key: &str) -> AppResult<Option<String>>;
    fn set_preference(&self, key: &str, value: &str) -> AppResult<()>;
}

#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

impl PreferenceStore for Database {
    fn get_preference(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let value = conn
            .query_row("SELECT value FROM preferences WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_preference(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO preferences (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

/// Process-local store, used when no database is available and in tests.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_preference(&self, key: &str) -> AppResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| AppError::Internal("preference mutex poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set_preference(&self, key: &str, value: &str) -> AppResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| AppError::Internal("preference mutex poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Database, MemoryPreferences, PreferenceStore, STATUS_FILTER_KEY};

    #[test]
    fn database_round_trips_preference() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("state.sqlite");
        let db = Database::new(&db_path).expect("db");

        assert_eq!(db.get_preference(STATUS_FILTER_KEY).expect("get"), None);
        db.set_preference(STATUS_FILTER_KEY, "paused").expect("set");
        db.set_preference(STATUS_FILTER_KEY, "completed").expect("overwrite");
        assert_eq!(
            db.get_preference(STATUS_FILTER_KEY).expect("get").as_deref(),
            Some("completed")
        );
    }

    #[test]
    fn preference_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("nested").join("state.sqlite");
        {
            let db = Database::new(&db_path).expect("db");
            db.set_preference(STATUS_FILTER_KEY, "in-progress").expect("set");
        }
        let reopened = Database::new(&db_path).expect("reopen");
        assert_eq!(reopened.path(), db_path.as_path());
        assert_eq!(
            reopened.get_preference(STATUS_FILTER_KEY).expect("get").as_deref(),
            Some("in-progress")
        );
    }

    #[test]
    fn memory_store_overwrites() {
        let store = MemoryPreferences::new();
        store.set_preference("a", "1").expect("set");
        store.set_preference("a", "2").expect("set");
        assert_eq!(store.get_preference("a").expect("get").as_deref(), Some("2"));
        assert_eq!(store.get_preference("b").expect("get"), None);
    }
}
