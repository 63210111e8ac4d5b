//! Favorites ledger.
//!
//! A set of (word, dictionary) bookmarks. The dictionary reference is
//! nullable: favorites added with no active dictionary, and favorites whose
//! dictionary was deleted, share the NULL scope. Comparisons use `IS` so NULL
//! matches NULL.

use rusqlite::{OptionalExtension, TransactionBehavior};
use serde::Serialize;

use crate::db::{Database, now_timestamp};
use crate::error::Result;

/// One bookmarked entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteEntry {
    pub word: String,
    pub definition: String,
    pub added_at: String,
    pub dictionary_id: Option<i64>,
}

impl Database {
    /// Bookmark `word` in `dictionary_id`'s scope.
    ///
    /// Returns false without writing if the pair is already a favorite. The
    /// check and the insert run in one `BEGIN IMMEDIATE` transaction, so two
    /// concurrent callers cannot both insert.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the transaction fails.
    pub fn add_favorite(&mut self, word: &str, definition: &str, dictionary_id: Option<i64>) -> Result<bool> {
        let tx = self.conn_mut().transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM favorites WHERE word = ?1 AND dictionary_id IS ?2",
                rusqlite::params![word, dictionary_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO favorites (word, definition, dictionary_id, added_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![word, definition, dictionary_id, now_timestamp()],
        )?;
        tx.commit()?;
        Ok(true)
    }

    /// Remove `word` from `dictionary_id`'s scope. Returns true if a row went.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the DELETE fails.
    pub fn remove_favorite(&self, word: &str, dictionary_id: Option<i64>) -> Result<bool> {
        let removed = self.conn().execute(
            "DELETE FROM favorites WHERE word = ?1 AND dictionary_id IS ?2",
            rusqlite::params![word, dictionary_id],
        )?;
        Ok(removed > 0)
    }

    /// Up to `limit` favorites across every scope, newest first.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the SELECT fails.
    pub fn favorites(&self, limit: u32) -> Result<Vec<FavoriteEntry>> {
        let mut stmt = self.conn().prepare_cached(
            "SELECT word, definition, COALESCE(added_at, ''), dictionary_id FROM favorites
             ORDER BY added_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], |row| {
                Ok(FavoriteEntry {
                    word: row.get(0)?,
                    definition: row.get(1)?,
                    added_at: row.get(2)?,
                    dictionary_id: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Returns true if `word` is a favorite in `dictionary_id`'s scope.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` if the SELECT fails.
    pub fn is_favorite(&self, word: &str, dictionary_id: Option<i64>) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM favorites WHERE word = ?1 AND dictionary_id IS ?2",
                rusqlite::params![word, dictionary_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}
