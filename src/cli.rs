use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::{
    DB_NAME,
    constants::{DEFAULT_FAVORITES_LIMIT, DEFAULT_HISTORY_LIMIT, DEFAULT_SEARCH_LIMIT, DEFAULT_SUGGEST_LIMIT},
    db::PragmaConfig,
    decoder::CommandDecoder,
    error::{Result, WordyError},
};

#[cfg(target_os = "macos")]
const DEFAULT_MMAP_SIZE: i64 = 0;

#[cfg(not(target_os = "macos"))]
const DEFAULT_MMAP_SIZE: i64 = 256 * 1024 * 1024;

/// Decoder used when neither `--decoder` nor `WORDY_DECODER` is set.
pub const DEFAULT_DECODER: &str =
    "pyglossary {input} /dev/stdout --read-format=BabylonBgl --write-format=Tabfile";

/// Directory scanned when `wordy scan` gets no argument.
pub const DEFAULT_SCAN_DIR: &str = "sources";

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

/// CLI arguments for the dictionary manager.
#[derive(Parser, Debug)]
#[command(
    name = "wordy",
    version = env!("CARGO_PKG_VERSION"),
    about = "Offline dictionary manager with prefix search",
    long_about = concat!("Offline dictionary manager with prefix search

Imports dictionary source files into a local SQLite store and answers
case-insensitive prefix lookups, with search history and favorites.
Protected (encrypted) sources are rejected before decoding.

Version: ", env!("CARGO_PKG_VERSION"), "

DICTIONARIES:
  <DICT> arguments accept a dictionary id or its name (see `wordy list`).

DECODER:
  Sources are converted by an external command that prints
  word<TAB>definition lines. {input} in the template is replaced with the
  source path; without it the path is appended.

EXIT CODES:
  0   Success
  1   Internal error
  2   Rejected source, unknown dictionary or word
  3   File or directory not found, I/O failure
  4   Invalid configuration
  5   Store unreadable (status)")
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress log output (for CI/scripting)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Dictionary store (defaults to the platform data directory)
    #[arg(long, env = "WORDY_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain, global = true)]
    pub format: OutputFormat,

    /// Decoder command template
    #[arg(long, env = "WORDY_DECODER", default_value = DEFAULT_DECODER, global = true)]
    pub decoder: String,

    /// `SQLite` cache size in `KB` (negative) or `pages` (positive)
    #[arg(long, default_value = "-32000", value_parser = validate_cache_size)]
    pub pragma_cache_size: i64,

    /// Memory-mapped I/O size in bytes (0 = disabled on macOS)
    #[arg(long, default_value_t = DEFAULT_MMAP_SIZE, value_parser = validate_mmap_size)]
    pub pragma_mmap_size: i64,

    /// Database page size in bytes (must be power of 2, 512-65536)
    #[arg(long, default_value = "4096", value_parser = validate_page_size)]
    pub pragma_page_size: i64,

    /// Busy timeout in milliseconds (0 = disabled)
    #[arg(long, default_value = "5000", value_parser = validate_busy_timeout)]
    pub pragma_busy_timeout: i64,

    /// `SQLite` synchronous mode (`OFF`, `NORMAL`, `FULL`, `EXTRA`)
    #[arg(long, default_value = "NORMAL", value_parser = validate_synchronous)]
    pub pragma_synchronous: String,
}

/// Subcommands for wordy.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Import one source file, replacing a dictionary of the same name.
    Import {
        /// Source file (.bgl)
        file: PathBuf,
    },
    /// Import every new source file in a directory.
    Scan {
        /// Directory to scan (not recursive)
        #[arg(default_value = DEFAULT_SCAN_DIR)]
        directory: PathBuf,
    },
    /// List dictionaries.
    List,
    /// Delete a dictionary and its entries.
    Delete {
        /// Dictionary id or name
        dictionary: String,
    },
    /// Look up entries whose word starts with the query.
    Search {
        /// Dictionary id or name
        dictionary: String,
        /// Query (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Maximum entries to return
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
        /// Do not record the query in history
        #[arg(long)]
        no_history: bool,
    },
    /// Suggest words starting with a prefix.
    Suggest {
        /// Dictionary id or name
        dictionary: String,
        /// Word prefix
        prefix: String,
        /// Maximum words to return
        #[arg(long, default_value_t = DEFAULT_SUGGEST_LIMIT)]
        limit: u32,
    },
    /// Show or clear search history.
    History {
        /// Maximum records to show
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
        /// Delete all history
        #[arg(long)]
        clear: bool,
    },
    /// Manage favorites.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Show store health and counts.
    Status,
}

/// Favorites subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum FavoritesAction {
    /// List favorites, newest first.
    List {
        /// Maximum favorites to show
        #[arg(long, default_value_t = DEFAULT_FAVORITES_LIMIT)]
        limit: u32,
    },
    /// Bookmark a word.
    Add {
        /// Dictionary id or name
        dictionary: String,
        /// Word to bookmark
        word: String,
        /// Definition to store (defaults to the word's first entry)
        #[arg(long)]
        definition: Option<String>,
    },
    /// Remove a bookmark.
    Remove {
        /// Dictionary id or name
        dictionary: String,
        /// Word to remove
        word: String,
    },
    /// Check whether a word is bookmarked.
    Check {
        /// Dictionary id or name
        dictionary: String,
        /// Word to check
        word: String,
    },
}

/// Validates `cache_size`: must be positive (`pages`) or `-1000` to `-1000000` (`KB`).
fn validate_cache_size(s: &str) -> std::result::Result<i64, String> {
    let val: i64 = s.parse().map_err(|_| "invalid integer".to_string())?;

    match val {
        v if v > 0 => Ok(v),                              // Pages
        v if (-1_000_000..=-1_000).contains(&v) => Ok(v), // KB range
        _ => Err("must be positive (pages) or -1000 to -1000000 (KB)".to_string()),
    }
}

/// Validates `mmap_size`: must be between `0` and `256MB`.
fn validate_mmap_size(s: &str) -> std::result::Result<i64, String> {
    const MAX_MMAP: i64 = 256 * 1024 * 1024;

    let val: i64 = s.parse().map_err(|_| "invalid integer".to_string())?;

    if val < 0 {
        return Err("must be >= 0".to_string());
    }

    if val > MAX_MMAP {
        return Err(format!("must be <= {MAX_MMAP} (256MB)"));
    }

    Ok(val)
}

/// Validates `page_size`: must be power of 2 between `512` and `65536`.
fn validate_page_size(s: &str) -> std::result::Result<i64, String> {
    let val: i64 = s.parse().map_err(|_| "invalid integer".to_string())?;

    if !(512..=65536).contains(&val) {
        return Err("must be between 512 and 65536".to_string());
    }

    if (val & (val - 1)) != 0 {
        return Err("must be a power of 2".to_string());
    }

    Ok(val)
}

/// Validates `busy_timeout`: must be non-negative.
fn validate_busy_timeout(s: &str) -> std::result::Result<i64, String> {
    let val: i64 = s.parse().map_err(|_| "invalid integer".to_string())?;

    if val < 0 {
        return Err("must be >= 0".to_string());
    }

    Ok(val)
}

/// Validates synchronous mode: must be OFF, NORMAL, FULL, or EXTRA.
fn validate_synchronous(s: &str) -> std::result::Result<String, String> {
    match s.to_uppercase().as_str() {
        "OFF" | "NORMAL" | "FULL" | "EXTRA" => Ok(s.to_uppercase()),
        _ => Err("must be OFF, NORMAL, FULL, or EXTRA".to_string()),
    }
}

/// Default store location: `<data dir>/wordy/dictionaries.db`.
///
/// # Errors
/// Returns `WordyError::ConfigInvalid` if the platform has no data directory.
pub fn default_db_path() -> Result<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("wordy").join(DB_NAME)).ok_or_else(|| {
        WordyError::ConfigInvalid {
            field: "db".to_string(),
            value: String::new(),
            reason: "Could not determine data directory; pass --db".to_string(),
        }
    })
}

impl Cli {
    /// Resolved store path: `--db` / `WORDY_DB` with `~` expanded, else
    /// [`default_db_path`].
    ///
    /// # Errors
    /// Returns `WordyError::ConfigInvalid` if `~` or the data directory cannot
    /// be resolved.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db {
            Some(path) => Self::expand_tilde(path),
            None => default_db_path(),
        }
    }

    /// Expand tilde (`~`) to home directory in path.
    fn expand_tilde(path: &Path) -> Result<PathBuf> {
        if let Some(stripped) = path.to_str().and_then(|s| s.strip_prefix('~')) {
            let home = dirs::home_dir().ok_or_else(|| WordyError::ConfigInvalid {
                field: "db".to_string(),
                value: path.to_string_lossy().to_string(),
                reason: "Could not determine home directory".to_string(),
            })?;
            if stripped.is_empty() {
                return Ok(home);
            }
            if stripped.starts_with('/') || stripped.starts_with('\\') {
                return Ok(home.join(&stripped[1..]));
            }
        }
        Ok(path.to_path_buf())
    }

    /// PRAGMA configuration from the `--pragma-*` flags.
    #[must_use]
    pub fn pragma_config(&self) -> PragmaConfig {
        PragmaConfig {
            synchronous: self.pragma_synchronous.clone(),
            cache_size: self.pragma_cache_size,
            mmap_size: self.pragma_mmap_size,
            page_size: self.pragma_page_size,
            busy_timeout_ms: self.pragma_busy_timeout,
            ..PragmaConfig::default()
        }
    }

    /// Decoder built from `--decoder` / `WORDY_DECODER`.
    ///
    /// # Errors
    /// Returns `WordyError::ConfigInvalid` for an empty template.
    pub fn command_decoder(&self) -> Result<CommandDecoder> {
        CommandDecoder::from_template(&self.decoder)
    }

    /// Returns true if the command writes to the store.
    #[must_use]
    pub const fn writes_store(&self) -> bool {
        !matches!(self.command, Commands::Status)
    }
}
