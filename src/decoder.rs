//! The external decoder capability.
//!
//! Wordy never parses proprietary dictionary containers. A [`Decoder`] turns
//! a source path into a finite, single-pass stream of [`DecodedRecord`]s, or
//! fails with a [`DecodeError`]. [`CommandDecoder`] delegates to an external
//! converter that prints tab-separated `word<TAB>definition` lines.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::error::{Result, WordyError};

/// Placeholder replaced with the source path in a decoder command template.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// One record produced by a decoder.
///
/// Word and definition are raw bytes; ingestion coerces them to UTF-8 text and
/// drops records that fail. Data records (embedded resources, metadata) are
/// discarded by ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub is_data: bool,
    pub word: Vec<u8>,
    pub definition: Vec<u8>,
}

impl DecodedRecord {
    /// A textual word/definition record.
    pub fn entry(word: impl Into<Vec<u8>>, definition: impl Into<Vec<u8>>) -> Self {
        Self { is_data: false, word: word.into(), definition: definition.into() }
    }

    /// A non-textual record.
    pub fn data(name: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> Self {
        Self { is_data: true, word: name.into(), definition: payload.into() }
    }
}

/// Decoder failure; the message is classified by ingestion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Single-pass stream of decoded records.
pub type RecordStream<'a> =
    Box<dyn Iterator<Item = std::result::Result<DecodedRecord, DecodeError>> + 'a>;

/// Turns a source file into records.
///
/// Implementations must be shareable across threads; the manager may run
/// several ingestions concurrently.
pub trait Decoder: Send + Sync {
    /// Start decoding `path`.
    ///
    /// # Errors
    /// Returns `DecodeError` if the source is malformed or protected. Errors
    /// may also surface mid-stream as `Err` items.
    fn decode(&self, path: &Path) -> std::result::Result<RecordStream<'_>, DecodeError>;
}

/// Runs an external converter and reads tab-separated records from its stdout.
///
/// Output format, one record per line:
/// - `word<TAB>definition`, with `\n`, `\t` and `\\` escaped in both fields
/// - lines starting with `##`, or without a tab, are metadata (data records)
#[derive(Debug, Clone)]
pub struct CommandDecoder {
    program: String,
    args: Vec<String>,
}

impl CommandDecoder {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// Build from a whitespace-separated template such as
    /// `pyglossary {input} --write-format=Tabfile /dev/stdout`.
    ///
    /// If no argument contains [`INPUT_PLACEHOLDER`] the source path is
    /// appended as the last argument.
    ///
    /// # Errors
    /// Returns `WordyError::ConfigInvalid` for an empty template.
    pub fn from_template(template: &str) -> Result<Self> {
        let mut parts = template.split_whitespace().map(String::from);
        let program = parts.next().ok_or_else(|| WordyError::ConfigInvalid {
            field: "decoder".to_string(),
            value: template.to_string(),
            reason: "empty command".to_string(),
        })?;
        Ok(Self::new(program, parts.collect()))
    }

    /// Program the decoder runs.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn command_args(&self, path: &Path) -> Vec<OsString> {
        let mut substituted = false;
        let mut args: Vec<OsString> = self
            .args
            .iter()
            .map(|arg| {
                if arg == INPUT_PLACEHOLDER {
                    substituted = true;
                    path.as_os_str().to_os_string()
                } else if arg.contains(INPUT_PLACEHOLDER) {
                    substituted = true;
                    OsString::from(arg.replace(INPUT_PLACEHOLDER, &path.to_string_lossy()))
                } else {
                    OsString::from(arg)
                }
            })
            .collect();
        if !substituted {
            args.push(path.as_os_str().to_os_string());
        }
        args
    }
}

impl Decoder for CommandDecoder {
    fn decode(&self, path: &Path) -> std::result::Result<RecordStream<'_>, DecodeError> {
        let mut child = Command::new(&self.program)
            .args(self.command_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DecodeError::new(format!("failed to run '{}': {e}", self.program)))?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(DecodeError::new(format!("no output pipe from '{}'", self.program)));
        };

        // Drained on its own thread so a chatty converter never blocks on a full pipe
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        Ok(Box::new(ChildRecords {
            records: TabfileRecords::new(BufReader::new(stdout)),
            child: Some(child),
            stderr,
            program: &self.program,
        }))
    }
}

/// Records streamed from a running converter. The exit status is checked once
/// stdout is exhausted; a failure surfaces as the final `Err` item.
struct ChildRecords<'a> {
    records: TabfileRecords<BufReader<ChildStdout>>,
    child: Option<Child>,
    stderr: Option<JoinHandle<Vec<u8>>>,
    program: &'a str,
}

impl ChildRecords<'_> {
    fn finish(&mut self) -> std::result::Result<(), DecodeError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| DecodeError::new(format!("failed to wait for '{}': {e}", self.program)))?;
        let stderr = self.stderr.take().and_then(|handle| handle.join().ok()).unwrap_or_default();

        if status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
        let message = if stderr.is_empty() { format!("decoder exited with {status}") } else { stderr };
        Err(DecodeError::new(message))
    }
}

impl Iterator for ChildRecords<'_> {
    type Item = std::result::Result<DecodedRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.records.next() {
            return Some(record);
        }
        self.finish().err().map(Err)
    }
}

impl Drop for ChildRecords<'_> {
    fn drop(&mut self) {
        // Abandoned mid-stream
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Iterator over the lines of tab-separated decoder output.
struct TabfileRecords<R> {
    reader: R,
    line: Vec<u8>,
    done: bool,
}

impl<R: BufRead> TabfileRecords<R> {
    const fn new(reader: R) -> Self {
        Self { reader, line: Vec::new(), done: false }
    }
}

impl<R: BufRead> Iterator for TabfileRecords<R> {
    type Item = std::result::Result<DecodedRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    let line = self.line.strip_suffix(b"\n").unwrap_or(&self.line);
                    if let Some(record) = parse_tabfile_line(line) {
                        return Some(Ok(record));
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(DecodeError::new(format!("failed to read decoder output: {e}"))));
                }
            }
        }
        None
    }
}

/// Parse one tab-separated line. Blank lines yield `None`.
#[must_use]
pub fn parse_tabfile_line(line: &[u8]) -> Option<DecodedRecord> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.is_empty() {
        return None;
    }
    if line.starts_with(b"##") {
        return Some(DecodedRecord::data(line.to_vec(), Vec::new()));
    }
    match line.iter().position(|b| *b == b'\t') {
        Some(tab) => Some(DecodedRecord::entry(unescape(&line[..tab]), unescape(&line[tab + 1..]))),
        None => Some(DecodedRecord::data(line.to_vec(), Vec::new())),
    }
}

fn unescape(field: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(field.len());
    let mut bytes = field.iter().copied();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'n') => out.push(b'\n'),
            Some(b't') => out.push(b'\t'),
            Some(b'\\') => out.push(b'\\'),
            Some(other) => {
                out.push(b'\\');
                out.push(other);
            }
            None => out.push(b'\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_line() {
        let record = parse_tabfile_line(b"hello\tgreeting").unwrap();
        assert_eq!(record, DecodedRecord::entry("hello", "greeting"));
    }

    #[test]
    fn test_parse_unescapes_fields() {
        let record = parse_tabfile_line(b"a\\tb\tline1\\nline2\\\\end\r").unwrap();
        assert_eq!(record.word, b"a\tb");
        assert_eq!(record.definition, b"line1\nline2\\end");
    }

    #[test]
    fn test_parse_unknown_escape_kept() {
        let record = parse_tabfile_line(b"w\tx\\qy\\").unwrap();
        assert_eq!(record.definition, b"x\\qy\\");
    }

    #[test]
    fn test_parse_metadata_lines_are_data() {
        assert!(parse_tabfile_line(b"##name\tMy Dictionary").unwrap().is_data);
        assert!(parse_tabfile_line(b"no tab here").unwrap().is_data);
        assert!(parse_tabfile_line(b"").is_none());
        assert!(parse_tabfile_line(b"\r").is_none());
    }

    #[test]
    fn test_tabfile_records_iterates_lines() {
        let records: Vec<DecodedRecord> =
            TabfileRecords::new(&b"##title\tT\n\na\t1\r\nb\t2"[..]).map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert!(records[0].is_data);
        assert_eq!(records[1], DecodedRecord::entry("a", "1"));
        assert_eq!(records[2], DecodedRecord::entry("b", "2"));
    }

    #[test]
    fn test_from_template_rejects_empty() {
        assert!(matches!(
            CommandDecoder::from_template("   "),
            Err(WordyError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_command_args_substitutes_placeholder() {
        let decoder =
            CommandDecoder::from_template("conv --in={input} {input} --out=-").unwrap();
        assert_eq!(decoder.program(), "conv");
        let args = decoder.command_args(Path::new("/s/d.bgl"));
        assert_eq!(args, vec!["--in=/s/d.bgl", "/s/d.bgl", "--out=-"]);
    }

    #[test]
    fn test_command_args_appends_path_without_placeholder() {
        let decoder = CommandDecoder::from_template("cat").unwrap();
        let args = decoder.command_args(Path::new("/s/d.bgl"));
        assert_eq!(args, vec!["/s/d.bgl"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_decoder_reads_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.bgl");
        std::fs::write(&path, "cat\tanimal\ndog\tanimal\n").unwrap();

        let decoder = CommandDecoder::from_template("cat").unwrap();
        let records: Vec<DecodedRecord> =
            decoder.decode(&path).unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records, vec![
            DecodedRecord::entry("cat", "animal"),
            DecodedRecord::entry("dog", "animal"),
        ]);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_decoder_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = CommandDecoder::from_template("cat").unwrap();
        let mut stream = decoder.decode(&dir.path().join("missing.bgl")).unwrap();
        let err = stream.next().unwrap().unwrap_err();
        assert!(err.message.contains("missing.bgl"));
        assert!(stream.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_decoder_streams_before_exit() {
        let decoder = CommandDecoder::new(
            "sh",
            vec!["-c".to_string(), "printf 'a\\t1\\n'; sleep 30".to_string(), "sh".to_string()],
        );
        let started = std::time::Instant::now();
        let mut stream = decoder.decode(Path::new("x.bgl")).unwrap();
        assert_eq!(stream.next().unwrap().unwrap(), DecodedRecord::entry("a", "1"));
        drop(stream);
        assert!(started.elapsed() < std::time::Duration::from_secs(20));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_decoder_exit_status_after_records() {
        let decoder = CommandDecoder::new(
            "sh",
            vec!["-c".to_string(), "printf 'a\\t1\\n'; echo 'password required' >&2; exit 3".to_string()],
        );
        let items: Vec<_> = decoder.decode(Path::new("x.bgl")).unwrap().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok(DecodedRecord::entry("a", "1")));
        assert_eq!(items[1], Err(DecodeError::new("password required")));
    }

    #[test]
    fn test_command_decoder_missing_program() {
        let decoder = CommandDecoder::new("wordy-no-such-decoder-program", vec![]);
        let err = decoder.decode(Path::new("x.bgl")).err().unwrap();
        assert!(err.message.contains("failed to run"));
    }
}
