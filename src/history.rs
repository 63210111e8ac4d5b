//! Search history ledger.
//!
//! Append-only and capped at [`HISTORY_CAP`] records. Rows outlive the
//! dictionary they were recorded against (the reference becomes NULL).

use rusqlite::TransactionBehavior;
use serde::Serialize;

use crate::constants::HISTORY_CAP;
use crate::db::{Database, now_timestamp};
use crate::error::Result;

/// One recorded query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub query: String,
    pub searched_at: String,
    pub dictionary_id: Option<i64>,
}

impl Database {
    /// Record trimmed `query` against `dictionary_id`, then prune to the newest
    /// [`HISTORY_CAP`] records. Blank queries are ignored (returns false).
    ///
    /// Insert and prune share one `BEGIN IMMEDIATE` transaction, so concurrent
    /// recorders never leave the ledger above the cap.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the transaction fails.
    pub fn record_search(&mut self, query: &str, dictionary_id: Option<i64>) -> Result<bool> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(false);
        }

        let tx = self.conn_mut().transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO search_history (query, dictionary_id, searched_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![query, dictionary_id, now_timestamp()],
        )?;
        let pruned = tx.execute(
            "DELETE FROM search_history WHERE id NOT IN (
                 SELECT id FROM search_history ORDER BY searched_at DESC, id DESC LIMIT ?1
             )",
            [HISTORY_CAP],
        )?;
        tx.commit()?;

        if pruned > 0 {
            tracing::debug!(pruned, "Pruned search history");
        }
        Ok(true)
    }

    /// Up to `limit` records, newest first.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the SELECT fails.
    pub fn recent_searches(&self, limit: u32) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn().prepare_cached(
            "SELECT query, COALESCE(searched_at, ''), dictionary_id FROM search_history
             ORDER BY searched_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], |row| {
                Ok(HistoryEntry {
                    query: row.get(0)?,
                    searched_at: row.get(1)?,
                    dictionary_id: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete every history record. Returns the number removed.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the DELETE fails.
    pub fn clear_history(&self) -> Result<u64> {
        let removed = self.conn().execute("DELETE FROM search_history", [])?;
        Ok(removed as u64)
    }

    /// Number of history records.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the COUNT query fails.
    pub fn history_count(&self) -> Result<u64> {
        let count: i64 =
            self.conn().query_row("SELECT COUNT(*) FROM search_history", [], |row| row.get(0))?;
        Ok(count.unsigned_abs())
    }
}
