//! Dictionary manager: the one entry point the presentation layer talks to.
//!
//! Each operation opens its own connection, so a manager can be shared across
//! threads (`&DictionaryManager` is `Sync`). Writes serialize on SQLite's
//! `BEGIN IMMEDIATE` lock; reads run concurrently under WAL.

use std::path::{Path, PathBuf};

use crate::db::{Database, DictionaryInfo, DictionarySummary, Entry, PragmaConfig};
use crate::decoder::Decoder;
use crate::error::Result;
use crate::favorites::FavoriteEntry;
use crate::history::HistoryEntry;
use crate::ingest::{ImportOutcome, IngestConfig, Ingestor};
use crate::scanner::{ScanRecord, ScanStatus, Scanner};
use crate::search::{SearchConfig, Searcher};
use crate::session::Session;

/// Owns the store location, the decoder and the active-dictionary session.
pub struct DictionaryManager<D: Decoder> {
    db_path: PathBuf,
    pragma: PragmaConfig,
    ingest: IngestConfig,
    search: SearchConfig,
    decoder: D,
    session: Session,
}

impl<D: Decoder> DictionaryManager<D> {
    /// Open (creating if needed) the store at `db_path` and bring its schema
    /// up to date. No dictionary is active.
    ///
    /// # Errors
    /// Returns `WordyError::ForeignDatabase` if the file belongs to another
    /// application and `WordyError::Storage` if schema setup fails.
    pub fn open(db_path: &Path, pragma: PragmaConfig, decoder: D) -> Result<Self> {
        let db = Database::open(db_path, &pragma)?;
        db.init_schema()?;
        tracing::debug!(path = %db_path.display(), "Store ready");

        Ok(Self {
            db_path: db_path.to_path_buf(),
            pragma,
            ingest: IngestConfig::default(),
            search: SearchConfig::default(),
            decoder,
            session: Session::new(),
        })
    }

    /// Replace the ingestion configuration.
    #[must_use]
    pub fn with_ingest_config(mut self, config: IngestConfig) -> Self {
        self.ingest = config;
        self
    }

    /// Replace the search configuration.
    #[must_use]
    pub fn with_search_config(mut self, config: SearchConfig) -> Self {
        self.search = config;
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub const fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    fn connect(&self) -> Result<Database> {
        Database::open(&self.db_path, &self.pragma)
    }

    /// Ingest one source file and make it the active dictionary.
    ///
    /// # Errors
    /// Any ingestion error; the store and the session are unchanged on failure.
    pub fn import(&self, path: &Path) -> Result<ImportOutcome> {
        let mut db = self.connect()?;
        let outcome = Ingestor::new(&mut db, &self.decoder, &self.ingest).ingest(path)?;
        self.session.set(Some(outcome.dictionary_id));
        Ok(outcome)
    }

    /// Import every new source file in `directory`.
    ///
    /// The last successfully imported dictionary becomes active.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the store cannot be read; per-file
    /// failures are reported as records.
    pub fn scan_and_import(&self, directory: &Path) -> Result<Vec<ScanRecord>> {
        let mut db = self.connect()?;
        let records = Scanner::new(&mut db, &self.decoder, &self.ingest).scan(directory)?;

        let imported = records
            .iter()
            .rev()
            .find(|r| r.status == ScanStatus::Success)
            .and_then(|r| r.dictionary_id);
        if imported.is_some() {
            self.session.set(imported);
        }
        Ok(records)
    }

    /// Every dictionary, ordered by name.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn list_dictionaries(&self) -> Result<Vec<DictionarySummary>> {
        self.connect()?.list_dictionaries()
    }

    /// Full metadata for one dictionary.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn dictionary_info(&self, id: i64) -> Result<Option<DictionaryInfo>> {
        self.connect()?.dictionary_info(id)
    }

    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn dictionary_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        self.connect()?.dictionary_id_by_name(name)
    }

    /// Resolve a dictionary reference: an existing numeric id first, then a
    /// name.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if a lookup fails.
    pub fn resolve(&self, reference: &str) -> Result<Option<i64>> {
        let db = self.connect()?;
        if let Ok(id) = reference.trim().parse::<i64>() {
            if db.dictionary_exists(id)? {
                return Ok(Some(id));
            }
        }
        db.dictionary_id_by_name(reference)
    }

    /// Make `id` the active dictionary. Returns false (and changes nothing)
    /// if no such dictionary exists.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the lookup fails.
    pub fn set_active(&self, id: i64) -> Result<bool> {
        if !self.connect()?.dictionary_exists(id)? {
            return Ok(false);
        }
        self.session.set(Some(id));
        Ok(true)
    }

    /// Currently active dictionary id.
    pub fn active(&self) -> Option<i64> {
        self.session.active()
    }

    /// Delete a dictionary and its entries. If it was active, no dictionary is
    /// active afterwards. Returns false if the id was unknown.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the delete fails.
    pub fn delete_dictionary(&self, id: i64) -> Result<bool> {
        let removed = self.connect()?.delete_dictionary(id)?;
        if removed {
            self.session.clear_if(id);
            tracing::info!(id, "Dictionary deleted");
        }
        Ok(removed)
    }

    /// Prefix search in the active dictionary, at most
    /// [`SearchConfig::max_results`] entries.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn search(&self, query: &str) -> Result<Vec<Entry>> {
        self.search_limited(query, self.search.max_results)
    }

    /// Prefix search in the active dictionary, at most `limit` entries.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn search_limited(&self, query: &str, limit: u32) -> Result<Vec<Entry>> {
        let db = self.connect()?;
        Searcher::new(&db, self.active(), self.search.clone()).search_limited(query, limit)
    }

    /// Distinct-word suggestions from the active dictionary, at most
    /// [`SearchConfig::max_suggestions`].
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn suggest(&self, prefix: &str) -> Result<Vec<String>> {
        self.suggest_limited(prefix, self.search.max_suggestions)
    }

    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn suggest_limited(&self, prefix: &str, limit: u32) -> Result<Vec<String>> {
        let db = self.connect()?;
        Searcher::new(&db, self.active(), self.search.clone()).suggest_limited(prefix, limit)
    }

    /// Definition of `word` in the active dictionary: the first exact match,
    /// else the first case-insensitive one. `None` with no active dictionary.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn definition_of(&self, word: &str) -> Result<Option<String>> {
        let Some(id) = self.active() else {
            return Ok(None);
        };
        self.connect()?.first_definition(id, word)
    }

    /// Record a query in history, tagged with the active dictionary.
    /// Returns false for blank queries.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the write fails.
    pub fn record_search(&self, query: &str) -> Result<bool> {
        self.connect()?.record_search(query, self.active())
    }

    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn recent_searches(&self, limit: u32) -> Result<Vec<HistoryEntry>> {
        self.connect()?.recent_searches(limit)
    }

    /// # Errors
    /// Returns `WordyError::Storage` if the delete fails.
    pub fn clear_history(&self) -> Result<u64> {
        self.connect()?.clear_history()
    }

    /// Bookmark `word` in the active dictionary. Returns false if it already is.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the write fails.
    pub fn add_favorite(&self, word: &str, definition: &str) -> Result<bool> {
        self.connect()?.add_favorite(word, definition, self.active())
    }

    /// # Errors
    /// Returns `WordyError::Storage` if the delete fails.
    pub fn remove_favorite(&self, word: &str) -> Result<bool> {
        self.connect()?.remove_favorite(word, self.active())
    }

    /// Favorites across all dictionaries, newest first.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn favorites(&self, limit: u32) -> Result<Vec<FavoriteEntry>> {
        self.connect()?.favorites(limit)
    }

    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn is_favorite(&self, word: &str) -> Result<bool> {
        self.connect()?.is_favorite(word, self.active())
    }
}
