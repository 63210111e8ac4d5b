//! Directory scanner: import every new source file in one directory.
//!
//! Non-recursive. Files whose absolute path is already a stored source path
//! are skipped; each remaining file is ingested independently, and a failure
//! is recorded without stopping the scan.

use ignore::WalkBuilder;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::db::Database;
use crate::decoder::Decoder;
use crate::error::{Result, WordyError};
use crate::ingest::{IngestConfig, Ingestor};

/// Outcome category of one scan record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Skip,
    Success,
    Error,
    Info,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Skip => "skip",
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        };
        f.write_str(label)
    }
}

/// One line of a scan report.
///
/// `file` is the file name, absent for directory-level records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRecord {
    pub file: Option<String>,
    pub status: ScanStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary_id: Option<i64>,
}

impl ScanRecord {
    fn directory(status: ScanStatus, message: String) -> Self {
        Self { file: None, status, message, dictionary_id: None }
    }

    fn file(name: String, status: ScanStatus, message: String) -> Self {
        Self { file: Some(name), status, message, dictionary_id: None }
    }
}

/// Scans a directory and ingests new sources.
pub struct Scanner<'a, D: Decoder + ?Sized> {
    db: &'a mut Database,
    decoder: &'a D,
    config: &'a IngestConfig,
}

impl<'a, D: Decoder + ?Sized> Scanner<'a, D> {
    pub fn new(db: &'a mut Database, decoder: &'a D, config: &'a IngestConfig) -> Self {
        Self { db, decoder, config }
    }

    /// Scan `directory` and return one record per candidate file.
    ///
    /// A missing directory yields a single `Error` record; a directory with no
    /// candidates yields a single `Info` record.
    ///
    /// # Errors
    /// Returns `WordyError::Storage` only if the stored source paths cannot be
    /// read. Per-file failures are reported as records.
    pub fn scan(&mut self, directory: &Path) -> Result<Vec<ScanRecord>> {
        if !directory.is_dir() {
            let error = WordyError::DirectoryNotFound { path: directory.display().to_string() };
            tracing::warn!(error = %error, "Scan aborted");
            return Ok(vec![ScanRecord::directory(ScanStatus::Error, error.to_string())]);
        }

        let candidates = self.candidates(directory);
        if candidates.is_empty() {
            return Ok(vec![ScanRecord::directory(
                ScanStatus::Info,
                format!("no .{} files found in directory", self.config.extension),
            )]);
        }

        let mut known = self.db.source_paths()?;
        let mut records = Vec::with_capacity(candidates.len());

        for path in candidates {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let absolute = std::path::absolute(&path).unwrap_or_else(|_| path.clone());
            let key = absolute.to_string_lossy().into_owned();

            if known.contains(&key) {
                tracing::debug!(path = %key, "Already imported");
                records.push(ScanRecord::file(name, ScanStatus::Skip, "already imported".to_string()));
                continue;
            }

            match Ingestor::new(self.db, self.decoder, self.config).ingest(&path) {
                Ok(outcome) => {
                    known.insert(outcome.source_path);
                    records.push(ScanRecord {
                        dictionary_id: Some(outcome.dictionary_id),
                        ..ScanRecord::file(name, ScanStatus::Success, outcome.message)
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %key, error = %e, "Failed to import file");
                    records.push(ScanRecord::file(name, ScanStatus::Error, e.to_string()));
                }
            }
        }

        Ok(records)
    }

    /// Regular files directly inside `directory` with the configured
    /// extension, in file-name order.
    fn candidates(&self, directory: &Path) -> Vec<PathBuf> {
        let walk = WalkBuilder::new(directory)
            .standard_filters(false) // Every file counts, hidden or ignored
            .max_depth(Some(1))
            .follow_links(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for result in walk {
            match result {
                Ok(entry) => {
                    if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        continue;
                    }
                    if self.config.matches_extension(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Directory walk error");
                }
            }
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DB_NAME;
    use crate::db::PragmaConfig;
    use crate::decoder::{DecodeError, DecodedRecord, RecordStream};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Yields two entries for every file, failing for names containing "bad".
    #[derive(Default)]
    struct TwoEntryDecoder {
        calls: AtomicUsize,
    }

    impl Decoder for TwoEntryDecoder {
        fn decode(&self, path: &Path) -> std::result::Result<RecordStream<'_>, DecodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if path.file_name().is_some_and(|n| n.to_string_lossy().contains("bad")) {
                return Err(DecodeError::new("corrupt block"));
            }
            Ok(Box::new(
                vec![Ok(DecodedRecord::entry("one", "1")), Ok(DecodedRecord::entry("two", "2"))]
                    .into_iter(),
            ))
        }
    }

    fn create_test_db(dir: &Path) -> Database {
        let db = Database::open(&dir.join(DB_NAME), &PragmaConfig::default()).unwrap();
        db.init_schema().unwrap();
        db
    }

    fn write_source(dir: &Path, name: &str) {
        fs::write(dir.join(name), [0x00, 0x01, 0x02]).unwrap();
    }

    #[test]
    fn test_missing_directory_single_error() {
        let dir = tempdir().unwrap();
        let mut db = create_test_db(dir.path());
        let decoder = TwoEntryDecoder::default();
        let config = IngestConfig::default();

        let records = Scanner::new(&mut db, &decoder, &config).scan(&dir.path().join("nope")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ScanStatus::Error);
        assert!(records[0].file.is_none());
        assert!(records[0].message.contains("directory not found"));
    }

    #[test]
    fn test_no_candidates_single_info() {
        let dir = tempdir().unwrap();
        let sources = dir.path().join("sources");
        fs::create_dir(&sources).unwrap();
        fs::write(sources.join("notes.txt"), "x").unwrap();
        let mut db = create_test_db(dir.path());
        let decoder = TwoEntryDecoder::default();
        let config = IngestConfig::default();

        let records = Scanner::new(&mut db, &decoder, &config).scan(&sources).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ScanStatus::Info);
    }

    #[test]
    fn test_skip_known_and_import_new() {
        let dir = tempdir().unwrap();
        let sources = dir.path().join("sources");
        fs::create_dir(&sources).unwrap();
        write_source(&sources, "a.bgl");
        let mut db = create_test_db(dir.path());
        let decoder = TwoEntryDecoder::default();
        let config = IngestConfig::default();

        let first = Scanner::new(&mut db, &decoder, &config).scan(&sources).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].status, ScanStatus::Success);

        write_source(&sources, "b.BGL");
        let second = Scanner::new(&mut db, &decoder, &config).scan(&sources).unwrap();
        let statuses: Vec<(Option<&str>, ScanStatus)> =
            second.iter().map(|r| (r.file.as_deref(), r.status)).collect();
        assert_eq!(statuses, vec![(Some("a.bgl"), ScanStatus::Skip), (Some("b.BGL"), ScanStatus::Success)]);
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failure_does_not_stop_scan() {
        let dir = tempdir().unwrap();
        let sources = dir.path().join("sources");
        fs::create_dir(&sources).unwrap();
        write_source(&sources, "a-bad.bgl");
        write_source(&sources, "b-good.bgl");
        let mut db = create_test_db(dir.path());
        let decoder = TwoEntryDecoder::default();
        let config = IngestConfig::default();

        let records = Scanner::new(&mut db, &decoder, &config).scan(&sources).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, ScanStatus::Error);
        assert!(records[0].message.contains("corrupt block"));
        assert_eq!(records[1].status, ScanStatus::Success);
        assert!(records[1].dictionary_id.is_some());
        assert_eq!(db.dictionary_count().unwrap(), 1);
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let dir = tempdir().unwrap();
        let sources = dir.path().join("sources");
        fs::create_dir_all(sources.join("nested")).unwrap();
        write_source(&sources.join("nested"), "deep.bgl");
        write_source(&sources, ".hidden.bgl");
        let mut db = create_test_db(dir.path());
        let decoder = TwoEntryDecoder::default();
        let config = IngestConfig::default();

        let records = Scanner::new(&mut db, &decoder, &config).scan(&sources).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file.as_deref(), Some(".hidden.bgl"));
    }

    #[test]
    fn test_scan_record_json() {
        let record = ScanRecord::file("a.bgl".to_string(), ScanStatus::Skip, "already imported".to_string());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "skip");
        assert!(value.get("dictionary_id").is_none());
    }
}
