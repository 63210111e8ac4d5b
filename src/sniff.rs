//! Header sniffing for dictionary sources.
//!
//! Looks at the first [`SNIFF_LEN`] bytes of a file to reject protected
//! sources before the (expensive) decoder runs. This is a fast-fail heuristic,
//! not a security boundary: protected files that slip through are caught by
//! the decode-error classification in [`crate::ingest`].

use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::constants::SNIFF_LEN;

/// Unprotected sources start with one of these two-byte headers.
const CLEAR_HEADERS: [[u8; 2]; 2] = [[0x00, 0x01], [0x01, 0x00]];

/// Signature of the commercial vendor's protected container.
const VENDOR_SIGNATURE: &[u8] = b"BAB";

/// Byte-order marks that only appear at the start of protected containers.
const BYTE_ORDER_MARKS: [[u8; 2]; 2] = [[0xFF, 0xFE], [0xFE, 0xFF]];

/// Name fragments of regional commercial dictionaries (and a gzip magic) that
/// indicate a protected build when the clear header is absent.
const REGIONAL_FRAGMENTS: [&[u8]; 4] = [b"hFarsi", b"Aryanpur", b"BGL", b"\x1f\x8b"];

/// Outcome of sniffing a source header. Every variant carries a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum SniffVerdict {
    /// Proceed to decode.
    Clear(String),
    /// Probably protected; rejected.
    LikelyEncrypted(String),
    /// Protected; rejected.
    Encrypted(String),
}

impl SniffVerdict {
    /// Returns true if ingestion must stop before decoding.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(self, Self::LikelyEncrypted(_) | Self::Encrypted(_))
    }

    /// Human-readable explanation of the verdict.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Clear(reason) | Self::LikelyEncrypted(reason) | Self::Encrypted(reason) => reason,
        }
    }
}

/// Classify the file at `path` by its header.
///
/// Never fails: an unreadable file is reported as `Clear` so the decoder can
/// raise the authoritative error.
#[must_use]
pub fn sniff(path: &Path) -> SniffVerdict {
    match read_header(path) {
        Ok(header) => sniff_bytes(&header),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Header read failed, deferring to decoder");
            SniffVerdict::Clear(format!("could not read header ({e}), deferring to decoder"))
        }
    }
}

/// Classify a header prefix. Rules apply in order; the first match wins.
#[must_use]
pub fn sniff_bytes(header: &[u8]) -> SniffVerdict {
    let header = &header[..header.len().min(SNIFF_LEN)];

    if has_clear_header(header) {
        return SniffVerdict::Clear("standard unencrypted header".to_string());
    }

    let lead = &header[..header.len().min(4)];
    if contains(header, VENDOR_SIGNATURE)
        || BYTE_ORDER_MARKS.iter().any(|bom| contains(lead, bom))
    {
        return SniffVerdict::Encrypted(
            "commercial vendor dictionary (DRM protected)".to_string(),
        );
    }

    if REGIONAL_FRAGMENTS.iter().any(|fragment| contains(header, fragment)) {
        return SniffVerdict::LikelyEncrypted(
            "regional commercial dictionary without a standard header".to_string(),
        );
    }

    SniffVerdict::Clear("unknown format, attempting decode optimistically".to_string())
}

fn has_clear_header(header: &[u8]) -> bool {
    CLEAR_HEADERS.iter().any(|clear| header.starts_with(clear))
}

fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut header)?;
    Ok(header)
}

#[inline]
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}
