//! Ingestion pipeline: one source file in, one persisted dictionary out.
//!
//! validate path → sniff header → derive name → decode → drain → clean →
//! replace atomically. A failure at any step leaves the store untouched.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::constants::SOURCE_EXTENSION;
use crate::db::{Database, Entry};
use crate::decoder::{DecodeError, Decoder};
use crate::error::{Result, WordyError};
use crate::sniff::sniff;

/// Decoder messages containing any of these (case-insensitive) mean the
/// source is protected rather than malformed.
const ENCRYPTION_KEYWORDS: [&str; 4] = ["encrypt", "password", "drm", "protected"];

/// Configuration for ingestion.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Expected source extension without the dot (compared case-insensitively)
    pub extension: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { extension: SOURCE_EXTENSION.to_string() }
    }
}

impl IngestConfig {
    /// Returns true if `path` carries the configured extension.
    #[must_use]
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

/// Successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub dictionary_id: i64,
    pub name: String,
    pub entry_count: u64,
    pub source_path: String,
    pub message: String,
}

/// Runs the ingestion pipeline against one store connection.
pub struct Ingestor<'a, D: Decoder + ?Sized> {
    db: &'a mut Database,
    decoder: &'a D,
    config: &'a IngestConfig,
}

impl<'a, D: Decoder + ?Sized> Ingestor<'a, D> {
    pub fn new(db: &'a mut Database, decoder: &'a D, config: &'a IngestConfig) -> Self {
        Self { db, decoder, config }
    }

    /// Ingest one source file, replacing any dictionary with the same name.
    ///
    /// # Errors
    /// - `NotFound` / `WrongExtension` for an invalid path
    /// - `EncryptionDetected` if the header sniffs as protected (the decoder
    ///   is not invoked) or the decoder reports protection
    /// - `Decode` for any other decoder failure
    /// - `EmptyResult` / `NoValidEntries` if nothing usable was decoded
    /// - `Storage` if the replace transaction fails (nothing is committed)
    pub fn ingest(&mut self, path: &Path) -> Result<ImportOutcome> {
        let source = validate_source(path, self.config)?;

        let verdict = sniff(&source);
        if verdict.is_protected() {
            tracing::warn!(path = %source.display(), reason = verdict.reason(), "Rejected protected source");
            return Err(WordyError::EncryptionDetected { reason: verdict.reason().to_string() });
        }
        tracing::debug!(path = %source.display(), reason = verdict.reason(), "Header check passed");

        let name = derive_dictionary_name(&source);
        let raw = drain_pairs(self.decoder, &decoder_path(&source))?;
        if raw.is_empty() {
            return Err(WordyError::EmptyResult);
        }

        let entries = clean_entries(raw);
        if entries.is_empty() {
            return Err(WordyError::NoValidEntries);
        }

        let source_path = source.to_string_lossy().into_owned();
        let dictionary_id = self.db.replace_dictionary(&name, &source_path, &entries)?;
        if let Err(e) = self.db.optimize() {
            tracing::debug!(error = %e, "Planner statistics refresh failed");
        }

        let entry_count = entries.len() as u64;
        tracing::info!(name = %name, entries = entry_count, path = %source_path, "Dictionary imported");

        Ok(ImportOutcome {
            dictionary_id,
            message: format!("Imported {} entries from '{name}'", group_thousands(entry_count)),
            name,
            entry_count,
            source_path,
        })
    }
}

/// Resolve `path` to an absolute path that exists and has the right extension.
fn validate_source(path: &Path, config: &IngestConfig) -> Result<PathBuf> {
    let source = std::path::absolute(path)?;
    if !source.exists() {
        return Err(WordyError::NotFound { path: source.to_string_lossy().into_owned() });
    }
    if !config.matches_extension(&source) {
        return Err(WordyError::WrongExtension {
            path: source.to_string_lossy().into_owned(),
            expected: config.extension.clone(),
        });
    }
    Ok(source)
}

/// Dictionary name from the file stem, with `.`, `-`, spaces and path
/// separators each replaced by `_`.
///
/// `sources/farsi-basic.bgl` becomes `farsi_basic`.
#[must_use]
pub fn derive_dictionary_name(path: &Path) -> String {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    stem.chars()
        .map(|ch| match ch {
            ' ' | '.' | '-' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// Path handed to the decoder.
///
/// Some decoders only recognise lower-case extensions. When the extension has
/// upper-case letters and the lower-cased path resolves (a case-insensitive
/// filesystem, or a sibling copy), that path is used; otherwise the original.
#[must_use]
pub fn decoder_path(source: &Path) -> PathBuf {
    let Some(ext) = source.extension().and_then(|e| e.to_str()) else {
        return source.to_path_buf();
    };
    let lower = ext.to_ascii_lowercase();
    if lower == ext {
        return source.to_path_buf();
    }

    let candidate = source.with_extension(lower);
    if candidate.exists() {
        tracing::debug!(from = %source.display(), to = %candidate.display(), "Normalized extension casing");
        candidate
    } else {
        source.to_path_buf()
    }
}

/// Drain the decoder, keeping non-data records whose word and definition are
/// both present.
fn drain_pairs<D: Decoder + ?Sized>(decoder: &D, path: &Path) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    let stream = decoder.decode(path).map_err(classify_decode_error)?;

    let mut pairs = Vec::new();
    for record in stream {
        let record = record.map_err(classify_decode_error)?;
        if record.is_data || record.word.is_empty() || record.definition.is_empty() {
            continue;
        }
        pairs.push((record.word, record.definition));
    }
    Ok(pairs)
}

/// Map a decoder failure to `EncryptionDetected` or `Decode`.
#[must_use]
pub fn classify_decode_error(error: DecodeError) -> WordyError {
    let lowered = error.message.to_lowercase();
    if ENCRYPTION_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        WordyError::EncryptionDetected {
            reason: format!("decoder reported protected content: {}", error.message),
        }
    } else {
        WordyError::Decode { message: error.message }
    }
}

/// Coerce to UTF-8 and trim; drop pairs that fail or end up empty.
#[must_use]
pub fn clean_entries(raw: Vec<(Vec<u8>, Vec<u8>)>) -> Vec<Entry> {
    raw.into_iter()
        .filter_map(|(word, definition)| {
            let word = String::from_utf8(word).ok()?;
            let definition = String::from_utf8(definition).ok()?;
            let (word, definition) = (word.trim(), definition.trim());
            if word.is_empty() || definition.is_empty() {
                return None;
            }
            Some(Entry::new(word, definition))
        })
        .collect()
}

/// `1234567` → `"1,234,567"`.
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
