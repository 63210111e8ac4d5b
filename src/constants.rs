/// SQLite application_id used to identify wordy databases.
pub const EXPECTED_APPLICATION_ID: u32 = 0x5752_4459;

/// application_id stored as i32 with the same bit pattern.
pub const APPLICATION_ID_I32: i32 = i32::from_ne_bytes(EXPECTED_APPLICATION_ID.to_ne_bytes());

/// Search history keeps only this many of the newest records.
pub const HISTORY_CAP: u32 = 100;

/// Default number of (word, definition) pairs returned by a search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Default number of distinct words returned by a suggestion lookup.
pub const DEFAULT_SUGGEST_LIMIT: u32 = 10;

/// Default number of history records returned by `recent`.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Default number of favorites returned by `list`.
pub const DEFAULT_FAVORITES_LIMIT: u32 = 50;

/// Number of leading bytes the format sniffer inspects.
pub const SNIFF_LEN: usize = 32;

/// File extension (without dot) of dictionary source files.
pub const SOURCE_EXTENSION: &str = "bgl";
