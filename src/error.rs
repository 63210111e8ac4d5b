use thiserror::Error;

/// Centralized error types for wordy.
///
/// All errors are explicit enum variants (no Box<dyn Error>). The `Display`
/// output of every ingestion variant is the reason string shown to the user.
#[derive(Error, Debug)]
pub enum WordyError {
    /// `SQLite` constraint violation or I/O failure during persistence
    #[error("storage error: {source}")]
    Storage {
        #[from]
        source: rusqlite::Error,
    },

    /// File system I/O operation failed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Source file does not exist
    #[error("file not found: {path}")]
    NotFound { path: String },

    /// Source file has the wrong extension
    #[error("file must have .{expected} extension (case-insensitive): {path}")]
    WrongExtension { path: String, expected: String },

    /// Source is protected; the decoder was not invoked or reported protection
    #[error("encryption detected: {reason}")]
    EncryptionDetected { reason: String },

    /// The decoder rejected the source
    #[error("decode error: {message}")]
    Decode { message: String },

    /// The decoder produced no (word, definition) pairs
    #[error("dictionary contains no entries (likely encrypted or corrupted)")]
    EmptyResult,

    /// Every decoded pair was dropped while cleaning
    #[error("no valid entries after cleaning (encoding issues)")]
    NoValidEntries,

    /// Scan target directory does not exist
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: String },

    /// No dictionary with this id or name
    #[error("unknown dictionary: {reference}")]
    UnknownDictionary { reference: String },

    /// Word has no entry in the dictionary
    #[error("'{word}' not found in dictionary {dictionary}")]
    UnknownWord { word: String, dictionary: String },

    /// Invalid configuration value
    #[error("invalid {field}: {value} ({reason})")]
    ConfigInvalid { field: String, value: String, reason: String },

    /// Database belongs to a different application (never overwritten)
    #[error("database belongs to different application (app_id: {app_id:#x})")]
    ForeignDatabase { app_id: u32 },

    /// JSON serialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl WordyError {
    /// Returns true for failures caused by the source file itself rather than
    /// the store or the environment.
    #[must_use]
    pub const fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::WrongExtension { .. }
                | Self::EncryptionDetected { .. }
                | Self::Decode { .. }
                | Self::EmptyResult
                | Self::NoValidEntries
        )
    }
}

/// Result type alias for wordy operations.
pub type Result<T> = std::result::Result<T, WordyError>;

/// Exit codes for the CLI application.
///
/// Based on BSD sysexits.h conventions for meaningful exit statuses.
/// Use `ExitCode::into()` to convert to `std::process::ExitCode`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Successful execution
    Ok = 0,
    /// General software error (internal error, unexpected state)
    Software = 1,
    /// Invalid input data (rejected source, unknown dictionary)
    DataErr = 2,
    /// I/O error (file not found, permission denied on files)
    IoErr = 3,
    /// No input provided (missing required arguments)
    NoInput = 4,
    /// Permission denied (access control failure)
    NoPerm = 5,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

impl From<&WordyError> for ExitCode {
    fn from(error: &WordyError) -> Self {
        match error {
            WordyError::Io { .. }
            | WordyError::NotFound { .. }
            | WordyError::DirectoryNotFound { .. } => Self::IoErr,
            WordyError::ConfigInvalid { .. } => Self::NoInput,
            e if e.is_source_error() => Self::DataErr,
            WordyError::ForeignDatabase { .. }
            | WordyError::UnknownDictionary { .. }
            | WordyError::UnknownWord { .. } => Self::DataErr,
            _ => Self::Software,
        }
    }
}
