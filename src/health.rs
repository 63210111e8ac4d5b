//! Store health checking.
//!
//! Read-only inspection of a dictionary store, used by `wordy status`.
//! Nothing here migrates or repairs.
//!
//! The result is a snapshot: another process may import or delete between
//! the check and whatever the caller does next.
//!
//! # Example
//!
//! ```rust,no_run
//! use wordy::health::{check_health, StoreHealth};
//! use std::path::Path;
//!
//! let health = check_health(Path::new("dictionaries.db"));
//! if health.is_unrecoverable() {
//!     eprintln!("store needs manual attention: {health:?}");
//! }
//! ```

use serde::Serialize;
use std::path::Path;

use crate::constants::EXPECTED_APPLICATION_ID;
use crate::db::Database;

/// Store health status.
///
/// Variants are ordered by severity - higher variants indicate worse states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum StoreHealth {
    /// Schema complete, at least one dictionary.
    Healthy,

    /// Schema complete, no dictionaries yet.
    Empty,

    /// No store file at the expected location. Created on first write.
    Missing,

    /// File exists but cannot be opened or read (permissions, not SQLite).
    Unreadable,

    /// Store opens but belongs to another application.
    /// Action: **never overwritten** - require manual resolution.
    WrongApplicationId,

    /// Store opens but tables or indexes are missing. Opening it for writing
    /// recreates them.
    SchemaInvalid,
}

impl StoreHealth {
    /// Returns true if searches can run against the store.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        matches!(self, Self::Healthy | Self::Empty)
    }

    /// Returns true if the store cannot be used without user action.
    #[must_use]
    pub const fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::WrongApplicationId | Self::Unreadable)
    }
}

/// Check store health at `db_path` without writing to it.
///
/// Checks, in order:
/// 1. File exists
/// 2. Opens read-only and answers queries
/// 3. `application_id` is ours (0 is accepted: stores from earlier versions)
/// 4. Schema complete
/// 5. Dictionary count > 0
#[must_use]
pub fn check_health(db_path: &Path) -> StoreHealth {
    if !db_path.exists() {
        return StoreHealth::Missing;
    }

    let Ok(db) = Database::open_readonly(db_path) else {
        return StoreHealth::Unreadable;
    };

    match db.get_application_id() {
        Some(0 | EXPECTED_APPLICATION_ID) => {}
        Some(_) => return StoreHealth::WrongApplicationId,
        None => return StoreHealth::Unreadable,
    }

    if !db.check_schema().is_complete() {
        return StoreHealth::SchemaInvalid;
    }

    match db.dictionary_count() {
        Ok(0) => StoreHealth::Empty,
        Ok(_) => StoreHealth::Healthy,
        Err(_) => StoreHealth::Unreadable,
    }
}

/// Summary of a store for the `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct StoreReport {
    pub path: String,
    pub health: StoreHealth,
    pub dictionaries: u64,
    pub entries: u64,
    pub history: u64,
    pub favorites: u64,
    pub journal_mode: Option<String>,
    pub missing_objects: Vec<&'static str>,
}

/// Inspect the store at `db_path`. Counts are zero when the store is not
/// readable.
#[must_use]
pub fn inspect(db_path: &Path) -> StoreReport {
    let health = check_health(db_path);
    let mut report = StoreReport {
        path: db_path.display().to_string(),
        health,
        dictionaries: 0,
        entries: 0,
        history: 0,
        favorites: 0,
        journal_mode: None,
        missing_objects: Vec::new(),
    };

    if !matches!(health, StoreHealth::Healthy | StoreHealth::Empty | StoreHealth::SchemaInvalid) {
        return report;
    }
    let Ok(db) = Database::open_readonly(db_path) else {
        return report;
    };

    let schema = db.check_schema();
    report.missing_objects = schema.missing_objects();
    report.journal_mode = db.get_journal_mode();
    if schema.has_dictionaries_table {
        report.dictionaries = db.dictionary_count().unwrap_or_default();
    }
    if schema.has_entries_table {
        report.entries = count_rows(&db, "entries");
    }
    if schema.has_history_table {
        report.history = db.history_count().unwrap_or_default();
    }
    if schema.has_favorites_table {
        report.favorites = count_rows(&db, "favorites");
    }
    report
}

fn count_rows(db: &Database, table: &str) -> u64 {
    db.conn()
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get::<_, i64>(0))
        .map(i64::unsigned_abs)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DB_NAME;
    use crate::constants::APPLICATION_ID_I32;
    use crate::db::{Entry, PragmaConfig};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_health_missing_database() {
        let dir = tempdir().unwrap();
        assert_eq!(check_health(&dir.path().join(DB_NAME)), StoreHealth::Missing);
    }

    #[test]
    fn test_health_empty_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join(DB_NAME);

        let db = Database::open(&db_path, &PragmaConfig::default()).unwrap();
        db.init_schema().unwrap();
        drop(db);

        let health = check_health(&db_path);
        assert_eq!(health, StoreHealth::Empty);
        assert!(health.is_usable());
    }

    #[test]
    fn test_health_healthy_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join(DB_NAME);

        let mut db = Database::open(&db_path, &PragmaConfig::default()).unwrap();
        db.init_schema().unwrap();
        db.replace_dictionary("d", "/d.bgl", &[Entry::new("a", "1")]).unwrap();
        drop(db);

        assert_eq!(check_health(&db_path), StoreHealth::Healthy);
    }

    #[test]
    fn test_health_wrong_application_id() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join(DB_NAME);

        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.pragma_update(None, "application_id", 0x1234_5678_i32).unwrap();
        conn.execute("CREATE TABLE notes (body TEXT)", []).unwrap();
        drop(conn);

        let health = check_health(&db_path);
        assert_eq!(health, StoreHealth::WrongApplicationId);
        assert!(health.is_unrecoverable());
    }

    #[test]
    fn test_health_garbage_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join(DB_NAME);
        fs::write(&db_path, b"not a sqlite database").unwrap();

        assert_eq!(check_health(&db_path), StoreHealth::Unreadable);
    }

    #[test]
    fn test_health_incomplete_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join(DB_NAME);

        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.pragma_update(None, "application_id", APPLICATION_ID_I32).unwrap();
        conn.execute(
            "CREATE TABLE dictionaries (id INTEGER PRIMARY KEY, name TEXT UNIQUE, source_path TEXT)",
            [],
        )
        .unwrap();
        drop(conn);

        let health = check_health(&db_path);
        assert_eq!(health, StoreHealth::SchemaInvalid);
        assert!(!health.is_unrecoverable());
    }

    #[test]
    fn test_legacy_store_without_application_id_is_accepted() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join(DB_NAME);

        let db = Database::open(&db_path, &PragmaConfig::default()).unwrap();
        db.init_schema().unwrap();
        db.conn().pragma_update(None, "application_id", 0).unwrap();
        drop(db);

        assert_eq!(check_health(&db_path), StoreHealth::Empty);
    }

    #[test]
    fn test_inspect_counts() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join(DB_NAME);

        let mut db = Database::open(&db_path, &PragmaConfig::default()).unwrap();
        db.init_schema().unwrap();
        let id = db
            .replace_dictionary("d", "/d.bgl", &[Entry::new("a", "1"), Entry::new("b", "2")])
            .unwrap();
        db.record_search("a", Some(id)).unwrap();
        db.add_favorite("a", "1", Some(id)).unwrap();
        drop(db);

        let report = inspect(&db_path);
        assert_eq!(report.health, StoreHealth::Healthy);
        assert_eq!(report.dictionaries, 1);
        assert_eq!(report.entries, 2);
        assert_eq!(report.history, 1);
        assert_eq!(report.favorites, 1);
        assert_eq!(report.journal_mode.as_deref(), Some("wal"));
        assert!(report.missing_objects.is_empty());
    }

    #[test]
    fn test_inspect_missing_store() {
        let dir = tempdir().unwrap();
        let report = inspect(&dir.path().join(DB_NAME));
        assert_eq!(report.health, StoreHealth::Missing);
        assert_eq!(report.dictionaries, 0);
    }
}
