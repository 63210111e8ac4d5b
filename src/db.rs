use chrono::Utc;
use rusqlite::functions::FunctionFlags;
use rusqlite::{OptionalExtension, ToSql, TransactionBehavior};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::constants::{APPLICATION_ID_I32, EXPECTED_APPLICATION_ID};
use crate::error::{Result, WordyError};

/// Timestamp layout. Sorts lexicographically alongside SQLite's
/// `CURRENT_TIMESTAMP` values written by older versions of the store.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Current UTC time in [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Unicode-aware lower-casing shared by queries and the `wordy_fold` SQL function.
#[inline]
#[must_use]
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// One word/definition pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub word: String,
    pub definition: String,
}

impl Entry {
    pub fn new(word: impl Into<String>, definition: impl Into<String>) -> Self {
        Self { word: word.into(), definition: definition.into() }
    }
}

/// Row of the dictionary list shown to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionarySummary {
    pub id: i64,
    pub name: String,
    pub word_count: u64,
}

/// Full dictionary metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryInfo {
    pub id: i64,
    pub name: String,
    pub source_path: String,
    pub word_count: u64,
    pub created_at: String,
    pub encrypted: bool,
}

/// Database configuration for PRAGMA settings.
#[derive(Debug, Clone)]
pub struct PragmaConfig {
    pub journal_mode: String,
    pub synchronous: String,
    pub cache_size: i64,
    pub temp_store: String,
    pub mmap_size: i64,
    pub page_size: i64,
    pub busy_timeout_ms: i64,
}

impl Default for PragmaConfig {
    fn default() -> Self {
        Self {
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
            cache_size: -32000, // 32MB, dictionaries reach low millions of entries
            temp_store: "MEMORY".to_string(),
            mmap_size: Self::default_mmap_size(),
            page_size: 4096,
            busy_timeout_ms: 5000,
        }
    }
}

impl PragmaConfig {
    /// Platform-aware `mmap_size` default.
    ///
    /// - **macOS**: Returns 0 (mmap unreliable on HFS+/APFS with `SQLite`)
    /// - **Linux/Other**: Returns 256MB
    #[cfg(target_os = "macos")]
    #[must_use]
    pub const fn default_mmap_size() -> i64 {
        0
    }

    /// Platform-aware mmap_size default (Linux/Other: 256MB).
    #[cfg(not(target_os = "macos"))]
    #[must_use]
    pub const fn default_mmap_size() -> i64 {
        256 * 1024 * 1024
    }
}

/// Columns added after the first release of the schema.
///
/// Each is added with `ALTER TABLE` when missing; a "duplicate column" failure
/// (another process migrated first) is not an error.
const ADDITIVE_COLUMNS: &[(&str, &str, &str)] = &[
    ("dictionaries", "word_count", "INTEGER DEFAULT 0"),
    ("dictionaries", "is_encrypted", "BOOLEAN DEFAULT 0"),
];

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS dictionaries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT UNIQUE NOT NULL,
        source_path TEXT NOT NULL,
        word_count INTEGER DEFAULT 0,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dictionary_id INTEGER NOT NULL,
        word TEXT NOT NULL,
        definition TEXT NOT NULL,
        FOREIGN KEY(dictionary_id) REFERENCES dictionaries(id) ON DELETE CASCADE
    )",
    // Cross-dictionary lookups
    "CREATE INDEX IF NOT EXISTS idx_word ON entries(word)",
    // Prefix search inside the active dictionary, already in word order
    "CREATE INDEX IF NOT EXISTS idx_dict_word ON entries(dictionary_id, word)",
    "CREATE TABLE IF NOT EXISTS search_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        query TEXT NOT NULL,
        dictionary_id INTEGER,
        searched_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY(dictionary_id) REFERENCES dictionaries(id) ON DELETE SET NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_history_searched_at ON search_history(searched_at)",
    "CREATE TABLE IF NOT EXISTS favorites (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word TEXT NOT NULL,
        definition TEXT NOT NULL,
        dictionary_id INTEGER,
        added_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY(dictionary_id) REFERENCES dictionaries(id) ON DELETE SET NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_favorites_word_dict ON favorites(word, dictionary_id)",
];

/// Dictionary store.
///
/// Four tables: `dictionaries`, `entries` (cascade-deleted with their
/// dictionary), and the `search_history` / `favorites` ledgers whose
/// dictionary reference is set to NULL when the dictionary goes away.
///
/// One `Database` wraps one connection. Callers that need concurrency open one
/// per thread: WAL mode lets readers proceed while a writer holds the
/// `BEGIN IMMEDIATE` lock, and `busy_timeout` queues competing writers.
pub struct Database {
    conn: rusqlite::Connection,
}

impl Database {
    fn apply_pragma(conn: &rusqlite::Connection, name: &str, value: impl ToSql) -> Result<()> {
        conn.pragma_update(None, name, value).map_err(|e| WordyError::Storage { source: e })
    }

    fn register_functions(conn: &rusqlite::Connection) -> Result<()> {
        conn.create_scalar_function(
            "wordy_fold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text = ctx.get::<Option<String>>(0)?;
                Ok(text.map(|t| fold_case(&t)))
            },
        )?;
        Ok(())
    }

    fn read_application_id(conn: &rusqlite::Connection) -> Result<u32> {
        let raw: i32 = conn.query_row("PRAGMA application_id", [], |row| row.get(0))?;
        Ok(u32::from_ne_bytes(raw.to_ne_bytes()))
    }

    /// Open database at path, creating if needed.
    ///
    /// Databases with application_id 0 (fresh files and stores written by
    /// earlier versions) are stamped with [`EXPECTED_APPLICATION_ID`].
    ///
    /// # Errors
    /// Returns `WordyError::ConfigInvalid` for a negative busy timeout,
    /// `WordyError::ForeignDatabase` if the file belongs to another
    /// application, and `WordyError::Storage` if opening or a PRAGMA fails.
    pub fn open(db_path: &Path, config: &PragmaConfig) -> Result<Self> {
        if config.busy_timeout_ms < 0 {
            return Err(WordyError::ConfigInvalid {
                field: "busy_timeout_ms".to_string(),
                value: config.busy_timeout_ms.to_string(),
                reason: "must be >= 0".to_string(),
            });
        }

        let conn = rusqlite::Connection::open(db_path)?;

        // Set first so the journal_mode switch below waits on concurrent openers
        #[allow(clippy::cast_sign_loss)]
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms as u64);
        conn.busy_timeout(busy_timeout)?;

        let app_id = Self::read_application_id(&conn)?;
        if app_id != 0 && app_id != EXPECTED_APPLICATION_ID {
            return Err(WordyError::ForeignDatabase { app_id });
        }

        Self::apply_pragma(&conn, "journal_mode", &config.journal_mode)?;
        Self::apply_pragma(&conn, "synchronous", &config.synchronous)?;
        Self::apply_pragma(&conn, "cache_size", config.cache_size)?;
        Self::apply_pragma(&conn, "temp_store", &config.temp_store)?;
        Self::apply_pragma(&conn, "mmap_size", config.mmap_size)?;
        Self::apply_pragma(&conn, "page_size", config.page_size)?;

        // Cascades and SET NULL depend on this
        Self::apply_pragma(&conn, "foreign_keys", "ON")?;
        Self::apply_pragma(&conn, "trusted_schema", "OFF")?;
        if app_id == 0 {
            Self::apply_pragma(&conn, "application_id", APPLICATION_ID_I32)?;
        }

        Self::register_functions(&conn)?;

        Ok(Self { conn })
    }

    /// Open database in read-only mode (health checks, inspection).
    ///
    /// No PRAGMA writes and no migration: readers must cope with older schemas.
    ///
    /// # Errors
    ///
    /// Returns error if database file doesn't exist or can't be opened.
    pub fn open_readonly(db_path: &Path) -> Result<Self> {
        use rusqlite::OpenFlags;

        let conn = rusqlite::Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::register_functions(&conn)?;

        Ok(Self { conn })
    }

    /// Initialize schema (idempotent - safe to call multiple times), then
    /// apply additive column migrations.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if any CREATE or ALTER statement fails.
    pub fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            self.conn.execute(statement, [])?;
        }
        self.migrate_schema()
    }

    /// Add any [`ADDITIVE_COLUMNS`] that are missing.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if an ALTER fails for a reason other than
    /// the column already existing.
    pub fn migrate_schema(&self) -> Result<()> {
        for &(table, column, declaration) in ADDITIVE_COLUMNS {
            if self.has_column(table, column)? {
                continue;
            }

            let sql = format!("ALTER TABLE {table} ADD COLUMN {column} {declaration}");
            match self.conn.execute(&sql, []) {
                Ok(_) => tracing::info!(table, column, "Migrated schema: added column"),
                Err(e) if is_duplicate_column(&e) => {
                    tracing::debug!(table, column, "Column added concurrently");
                }
                Err(e) => return Err(WordyError::Storage { source: e }),
            }
        }
        Ok(())
    }

    /// Returns true if `table` has a column called `column`.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the pragma query fails.
    pub fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
            [table, column],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// SQL expression reading `column`, or `fallback` when the column does not
    /// exist yet. NULLs also read as `fallback`.
    fn column_or(&self, table: &str, column: &str, fallback: &str) -> Result<String> {
        if self.has_column(table, column)? {
            Ok(format!("COALESCE({column}, {fallback})"))
        } else {
            Ok(fallback.to_string())
        }
    }

    /// Create a dictionary, or replace the entries of the one with the same name.
    ///
    /// All-or-nothing: metadata and every entry commit in one `BEGIN IMMEDIATE`
    /// transaction, so readers see either the old entries or the new ones.
    /// An existing dictionary keeps its id, so ledger references survive.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` on any constraint or I/O failure; the
    /// transaction is rolled back and previously committed data is untouched.
    pub fn replace_dictionary(
        &mut self,
        name: &str,
        source_path: &str,
        entries: &[Entry],
    ) -> Result<i64> {
        let word_count = i64::try_from(entries.len()).map_err(|_| WordyError::ConfigInvalid {
            field: "entries".to_string(),
            value: entries.len().to_string(),
            reason: "too many entries".to_string(),
        })?;

        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let id: i64 = tx.query_row(
            "INSERT INTO dictionaries (name, source_path, word_count, created_at, is_encrypted)
             VALUES (?1, ?2, ?3, ?4, 0)
             ON CONFLICT(name) DO UPDATE SET
                 source_path = excluded.source_path,
                 word_count = excluded.word_count,
                 is_encrypted = 0
             RETURNING id",
            rusqlite::params![name, source_path, word_count, now_timestamp()],
            |row| row.get(0),
        )?;

        tx.execute("DELETE FROM entries WHERE dictionary_id = ?1", [id])?;

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO entries (dictionary_id, word, definition) VALUES (?1, ?2, ?3)",
            )?;
            for entry in entries {
                stmt.execute(rusqlite::params![id, entry.word, entry.definition])?;
            }
        }

        tx.commit()?;
        Ok(id)
    }

    /// List dictionaries ordered by name.
    ///
    /// On a store that predates the `word_count` column every count reads as 0.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the SELECT fails.
    pub fn list_dictionaries(&self) -> Result<Vec<DictionarySummary>> {
        let word_count = self.column_or("dictionaries", "word_count", "0")?;
        let sql = format!("SELECT id, name, {word_count} FROM dictionaries ORDER BY name");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DictionarySummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    word_count: row.get::<_, i64>(2)?.max(0).unsigned_abs(),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Full metadata for one dictionary, or `None` if the id is unknown.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the SELECT fails.
    pub fn dictionary_info(&self, id: i64) -> Result<Option<DictionaryInfo>> {
        let word_count = self.column_or("dictionaries", "word_count", "0")?;
        let created_at = self.column_or("dictionaries", "created_at", "''")?;
        let encrypted = self.column_or("dictionaries", "is_encrypted", "0")?;
        let sql = format!(
            "SELECT id, name, source_path, {word_count}, {created_at}, {encrypted}
             FROM dictionaries WHERE id = ?1"
        );

        let info = self
            .conn
            .query_row(&sql, [id], |row| {
                Ok(DictionaryInfo {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    source_path: row.get(2)?,
                    word_count: row.get::<_, i64>(3)?.max(0).unsigned_abs(),
                    created_at: row.get(4)?,
                    encrypted: row.get::<_, i64>(5)? != 0,
                })
            })
            .optional()?;
        Ok(info)
    }

    /// Look up a dictionary id by its unique name.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the SELECT fails.
    pub fn dictionary_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row("SELECT id FROM dictionaries WHERE name = ?1", [name], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    /// Returns true if a dictionary with this id exists.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the SELECT fails.
    pub fn dictionary_exists(&self, id: i64) -> Result<bool> {
        let exists = self
            .conn
            .query_row("SELECT 1 FROM dictionaries WHERE id = ?1", [id], |_| Ok(()))
            .optional()?;
        Ok(exists.is_some())
    }

    /// Delete a dictionary. Entries cascade; ledger references become NULL.
    ///
    /// Returns false if no dictionary had this id.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the DELETE fails.
    pub fn delete_dictionary(&mut self, id: i64) -> Result<bool> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM dictionaries WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// Source paths of every stored dictionary.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the SELECT fails.
    pub fn source_paths(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT source_path FROM dictionaries")?;
        let paths = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(paths)
    }

    /// Number of entry rows stored for a dictionary.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the COUNT query fails.
    #[must_use = "returns count that should be used"]
    pub fn entry_count(&self, dictionary_id: i64) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE dictionary_id = ?1",
            [dictionary_id],
            |row| row.get(0),
        )?;
        Ok(count.unsigned_abs())
    }

    /// Number of dictionaries in the store.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the COUNT query fails.
    #[must_use = "returns count that should be used"]
    pub fn dictionary_count(&self) -> Result<u64> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM dictionaries", [], |row| row.get(0))?;
        Ok(count.unsigned_abs())
    }

    /// Entries of one dictionary whose case-folded word starts with the
    /// case-folded `prefix`, ordered by word.
    ///
    /// `prefix` is used as given; callers trim and reject blank input.
    /// LIKE wildcards in `prefix` match literally.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn search_prefix(&self, dictionary_id: i64, prefix: &str, limit: u32) -> Result<Vec<Entry>> {
        let pattern = format!("{}%", escape_like_pattern(&fold_case(prefix)));

        let mut stmt = self.conn.prepare_cached(
            "SELECT word, definition FROM entries
             WHERE dictionary_id = ?1 AND wordy_fold(word) LIKE ?2 ESCAPE '\\'
             ORDER BY word
             LIMIT ?3",
        )?;

        let mut results = Vec::with_capacity(limit.min(256) as usize);
        let rows = stmt.query_map(rusqlite::params![dictionary_id, pattern, limit], |row| {
            Ok(Entry { word: row.get(0)?, definition: row.get(1)? })
        })?;
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Distinct words of one dictionary matching `prefix` (same rule as
    /// [`Database::search_prefix`]), ordered.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn suggest_prefix(&self, dictionary_id: i64, prefix: &str, limit: u32) -> Result<Vec<String>> {
        let pattern = format!("{}%", escape_like_pattern(&fold_case(prefix)));

        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT word FROM entries
             WHERE dictionary_id = ?1 AND wordy_fold(word) LIKE ?2 ESCAPE '\\'
             ORDER BY word
             LIMIT ?3",
        )?;

        let words = stmt
            .query_map(rusqlite::params![dictionary_id, pattern, limit], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(words)
    }

    /// Definition of the first stored entry for `word` in one dictionary.
    ///
    /// An exact match wins; otherwise the first case-insensitive match.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if a query fails.
    pub fn first_definition(&self, dictionary_id: i64, word: &str) -> Result<Option<String>> {
        let word = word.trim();
        let exact = self
            .conn
            .prepare_cached(
                "SELECT definition FROM entries
                 WHERE dictionary_id = ?1 AND word = ?2
                 ORDER BY id LIMIT 1",
            )?
            .query_row(rusqlite::params![dictionary_id, word], |row| row.get::<_, String>(0))
            .optional()?;
        if exact.is_some() {
            return Ok(exact);
        }

        let folded = self
            .conn
            .prepare_cached(
                "SELECT definition FROM entries
                 WHERE dictionary_id = ?1 AND wordy_fold(word) = ?2
                 ORDER BY word, id LIMIT 1",
            )?
            .query_row(rusqlite::params![dictionary_id, fold_case(word)], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(folded)
    }

    /// Optimize `SQLite` query planner statistics.
    ///
    /// Called after bulk loads so the planner sees the new entry distribution.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the PRAGMA optimize command fails.
    pub fn optimize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize")?;
        Ok(())
    }

    /// Get database connection.
    pub const fn conn(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Get mut database connection (for transactions).
    pub const fn conn_mut(&mut self) -> &mut rusqlite::Connection {
        &mut self.conn
    }

    /// Check if all required schema objects exist.
    #[must_use]
    pub fn check_schema(&self) -> SchemaCheck {
        let mut check = SchemaCheck::default();

        let query = r"
            SELECT
                (SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='dictionaries'),
                (SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='entries'),
                (SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='search_history'),
                (SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='favorites'),
                (SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='idx_word'),
                (SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='idx_dict_word')
        ";

        if let Ok(row) = self.conn.query_row(query, [], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        }) {
            check.has_dictionaries_table = row.0 > 0;
            check.has_entries_table = row.1 > 0;
            check.has_history_table = row.2 > 0;
            check.has_favorites_table = row.3 > 0;
            check.has_word_index = row.4 > 0;
            check.has_dict_word_index = row.5 > 0;
        }

        check
    }

    /// Get `application_id` pragma value.
    #[must_use]
    pub fn get_application_id(&self) -> Option<u32> {
        Self::read_application_id(&self.conn).ok()
    }

    /// Get `journal_mode` pragma value.
    #[must_use]
    pub fn get_journal_mode(&self) -> Option<String> {
        self.conn.query_row("PRAGMA journal_mode", [], |row| row.get::<_, String>(0)).ok()
    }
}

fn is_duplicate_column(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(_, Some(message)) if message.contains("duplicate column")
    )
}

/// Escape LIKE wildcard characters in user input.
pub(crate) fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '%' => escaped.push_str("\\%"),
            '_' => escaped.push_str("\\_"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Result of schema completeness check.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Clone)]
pub struct SchemaCheck {
    pub has_dictionaries_table: bool,
    pub has_entries_table: bool,
    pub has_history_table: bool,
    pub has_favorites_table: bool,
    pub has_word_index: bool,
    pub has_dict_word_index: bool,
}

impl SchemaCheck {
    /// Returns true if all required schema objects exist.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.has_dictionaries_table
            && self.has_entries_table
            && self.has_history_table
            && self.has_favorites_table
            && self.has_word_index
            && self.has_dict_word_index
    }

    /// Count of tables (expected: 4).
    #[must_use]
    pub fn table_count(&self) -> usize {
        [
            self.has_dictionaries_table,
            self.has_entries_table,
            self.has_history_table,
            self.has_favorites_table,
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// Count of required indexes (expected: 2).
    #[must_use]
    pub fn index_count(&self) -> usize {
        usize::from(self.has_word_index) + usize::from(self.has_dict_word_index)
    }

    /// Get list of missing objects.
    #[must_use]
    pub fn missing_objects(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_dictionaries_table {
            missing.push("table: dictionaries");
        }
        if !self.has_entries_table {
            missing.push("table: entries");
        }
        if !self.has_history_table {
            missing.push("table: search_history");
        }
        if !self.has_favorites_table {
            missing.push("table: favorites");
        }
        if !self.has_word_index {
            missing.push("index: idx_word");
        }
        if !self.has_dict_word_index {
            missing.push("index: idx_dict_word");
        }
        missing
    }
}
