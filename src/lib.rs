//! wordy - Offline dictionary manager backed by `SQLite`
//!
//! Imports word/definition pairs from dictionary source files into a local
//! store and serves case-insensitive prefix lookups against one active
//! dictionary, with a capped search history and a favorites ledger.
//!
//! Source files are screened by a header sniffer before the external
//! [`Decoder`] runs, so protected sources are rejected cheaply.
//!
//! # Example
//!
//! ```rust
//! use wordy::{DictionaryManager, PragmaConfig, DB_NAME};
//! use wordy::decoder::{DecodeError, DecodedRecord, Decoder, RecordStream};
//! use std::path::Path;
//! use std::time::{SystemTime, UNIX_EPOCH};
//!
//! struct Greetings;
//!
//! impl Decoder for Greetings {
//!     fn decode(&self, _path: &Path) -> Result<RecordStream<'_>, DecodeError> {
//!         Ok(Box::new(vec![Ok(DecodedRecord::entry("hello", "a greeting"))].into_iter()))
//!     }
//! }
//!
//! let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
//! let root = std::env::temp_dir().join(format!("wordy-doctest-{unique}"));
//! std::fs::create_dir_all(&root)?;
//! std::fs::write(root.join("greetings.bgl"), [0x00, 0x01])?;
//!
//! let manager = DictionaryManager::open(&root.join(DB_NAME), PragmaConfig::default(), Greetings)?;
//! let outcome = manager.import(&root.join("greetings.bgl"))?;
//! assert_eq!(outcome.message, "Imported 1 entries from 'greetings'");
//! assert_eq!(manager.search("HEL")?.len(), 1);
//!
//! drop(manager);
//! let _ = std::fs::remove_dir_all(&root);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Default store filename.
pub const DB_NAME: &str = "dictionaries.db";

pub mod cli;
pub mod constants;
pub mod db;
pub mod decoder;
pub mod error;
pub mod favorites;
pub mod health;
pub mod history;
pub mod ingest;
pub mod manager;
pub mod scanner;
pub mod search;
pub mod session;
pub mod sniff;

pub use cli::OutputFormat;
pub use db::{Database, DictionaryInfo, DictionarySummary, Entry, PragmaConfig, SchemaCheck};
pub use decoder::{CommandDecoder, DecodeError, DecodedRecord, Decoder};
pub use error::{ExitCode, Result, WordyError};
pub use favorites::FavoriteEntry;
pub use health::{StoreHealth, StoreReport, check_health};
pub use history::HistoryEntry;
pub use ingest::{ImportOutcome, IngestConfig, Ingestor};
pub use manager::DictionaryManager;
pub use scanner::{ScanRecord, ScanStatus, Scanner};
pub use search::{SearchConfig, Searcher};
pub use session::Session;
pub use sniff::{SniffVerdict, sniff};
