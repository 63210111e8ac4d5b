use serde::Serialize;
use std::io::Write;

use crate::constants::{DEFAULT_SEARCH_LIMIT, DEFAULT_SUGGEST_LIMIT};
use crate::db::{Database, Entry};
use crate::error::Result;

pub use crate::cli::OutputFormat;

/// Configuration for search operations.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Output format
    pub format: OutputFormat,
    /// Maximum entries returned by a search
    pub max_results: u32,
    /// Maximum words returned by a suggestion
    pub max_suggestions: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Plain,
            max_results: DEFAULT_SEARCH_LIMIT,
            max_suggestions: DEFAULT_SUGGEST_LIMIT,
        }
    }
}

/// JSON output structure for search results.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    pub query: &'a str,
    pub results: &'a [Entry],
}

/// JSON output structure for suggestions.
#[derive(Debug, Serialize)]
pub struct JsonSuggestions<'a> {
    pub prefix: &'a str,
    pub suggestions: &'a [String],
}

/// Prefix search over one dictionary.
///
/// With no dictionary selected every query yields nothing.
pub struct Searcher<'a> {
    db: &'a Database,
    dictionary: Option<i64>,
    config: SearchConfig,
}

impl<'a> Searcher<'a> {
    /// Create a new searcher scoped to `dictionary`.
    pub const fn new(db: &'a Database, dictionary: Option<i64>, config: SearchConfig) -> Self {
        Self { db, dictionary, config }
    }

    /// Entries whose word starts with `query` (case-insensitive), ordered by
    /// word, at most `max_results`.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn search(&self, query: &str) -> Result<Vec<Entry>> {
        self.search_limited(query, self.config.max_results)
    }

    /// [`Searcher::search`] with an explicit limit.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn search_limited(&self, query: &str, limit: u32) -> Result<Vec<Entry>> {
        let Some((dictionary_id, prefix)) = self.scope(query) else {
            return Ok(vec![]);
        };
        self.db.search_prefix(dictionary_id, prefix, limit)
    }

    /// Distinct words starting with `prefix`, ordered, at most `max_suggestions`.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn suggest(&self, prefix: &str) -> Result<Vec<String>> {
        self.suggest_limited(prefix, self.config.max_suggestions)
    }

    /// # Errors
    /// Returns `WordyError::Storage` if the query fails.
    pub fn suggest_limited(&self, prefix: &str, limit: u32) -> Result<Vec<String>> {
        let Some((dictionary_id, prefix)) = self.scope(prefix) else {
            return Ok(vec![]);
        };
        self.db.suggest_prefix(dictionary_id, prefix, limit)
    }

    #[inline]
    fn scope<'q>(&self, query: &'q str) -> Option<(i64, &'q str)> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.dictionary.map(|id| (id, trimmed))
    }
}

/// Format and output search results.
///
/// Plain: `word<TAB>definition`, one entry per line, with line breaks inside
/// a definition flattened so each entry stays on one line.
///
/// # Errors
/// Returns `WordyError::Io` if writing fails and `WordyError::Json` if
/// serialization fails.
pub fn format_results<W: Write>(
    format: OutputFormat,
    query: &str,
    results: &[Entry],
    output: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            for entry in results {
                let definition = entry.definition.replace(['\r', '\n'], " ");
                writeln!(output, "{}\t{}", entry.word, definition)?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonOutput { query, results })?;
            writeln!(output, "{json}")?;
        }
    }
    Ok(())
}

/// Format and output suggestions, one word per line in plain format.
///
/// # Errors
/// Returns `WordyError::Io` if writing fails and `WordyError::Json` if
/// serialization fails.
pub fn format_suggestions<W: Write>(
    format: OutputFormat,
    prefix: &str,
    words: &[String],
    output: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            for word in words {
                writeln!(output, "{word}")?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonSuggestions { prefix, suggestions: words })?;
            writeln!(output, "{json}")?;
        }
    }
    Ok(())
}
