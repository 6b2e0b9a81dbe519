//! Content-based type and encoding detection

use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Best-guess type of a file's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sniffed {
    pub mime_type: String,
    pub encoding: String,
}

impl Sniffed {
    fn new(mime_type: &str, encoding: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            encoding: encoding.to_string(),
        }
    }
}

/// Guesses MIME type and text encoding from file bytes
pub trait ContentSniffer {
    fn sniff(&self, path: &Path) -> Result<Sniffed>;
}

/// Generic type for content nothing else matches
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Encoding reported for non-text content
pub const BINARY: &str = "binary";

// (offset, signature, mime type); first match wins
const SIGNATURES: &[(usize, &[u8], &str)] = &[
    (0, b"%PDF-", "application/pdf"),
    (0, b"PK\x03\x04", "application/zip"),
    (0, b"PK\x05\x06", "application/zip"),
    (0, b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1", "application/x-ole-storage"),
    (0, b"{\\rtf", "text/rtf"),
    (0, b"MZ", "application/x-dosexec"),
    (0, b"\x7fELF", "application/x-executable"),
    (0, b"\xca\xfe\xba\xbe", "application/x-java-applet"),
    (0, b"\x89PNG\r\n\x1a\n", "image/png"),
    (0, b"\xff\xd8\xff", "image/jpeg"),
    (0, b"GIF87a", "image/gif"),
    (0, b"GIF89a", "image/gif"),
    (0, b"\x1f\x8b", "application/gzip"),
    (0, b"BZh", "application/x-bzip2"),
    (0, b"\xfd7zXZ\x00", "application/x-xz"),
    (0, b"Rar!\x1a\x07", "application/x-rar"),
    (0, b"7z\xbc\xaf\x27\x1c", "application/x-7z-compressed"),
    (0, b"%!PS", "application/postscript"),
    (257, b"ustar", "application/x-tar"),
];

// Leading tokens of text formats, matched case-insensitively after whitespace
const TEXT_SIGNATURES: &[(&str, &str)] = &[
    ("<!doctype html", "text/html"),
    ("<html", "text/html"),
    ("<head", "text/html"),
    ("<body", "text/html"),
    ("<?xml", "text/xml"),
    ("return-path:", "message/rfc822"),
    ("received:", "message/rfc822"),
    ("delivered-to:", "message/rfc822"),
    ("message-id:", "message/rfc822"),
    ("mime-version:", "message/rfc822"),
];

/// Magic-number [`ContentSniffer`] over a bounded prefix of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagicSniffer {
    limit: usize,
}

impl Default for MagicSniffer {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl MagicSniffer {
    #[must_use]
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            limit: config.sniff_bytes.max(512),
        }
    }

    /// Classify a prefix of some content. `complete` is false when the
    /// prefix was cut short of the end of the content.
    #[must_use]
    pub fn sniff_bytes(&self, prefix: &[u8], complete: bool) -> Sniffed {
        if prefix.is_empty() && complete {
            return Sniffed::new("inode/x-empty", BINARY);
        }

        if let Some(mime_type) = match_signature(prefix) {
            let encoding = if mime_type.starts_with("text/") {
                text_encoding(prefix, complete).unwrap_or(BINARY)
            } else {
                BINARY
            };
            return Sniffed::new(mime_type, encoding);
        }

        if let Some(encoding) = bom_encoding(prefix) {
            return Sniffed::new("text/plain", encoding);
        }

        match text_encoding(prefix, complete) {
            Some(encoding) => Sniffed::new(match_text_signature(prefix), encoding),
            None => Sniffed::new(OCTET_STREAM, BINARY),
        }
    }
}

impl ContentSniffer for MagicSniffer {
    fn sniff(&self, path: &Path) -> Result<Sniffed> {
        let read_error = |source| Error::AttachmentRead {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(read_error)?;
        let mut prefix = Vec::new();
        // One byte past the limit tells us whether the prefix is the whole file
        file.take(self.limit as u64 + 1)
            .read_to_end(&mut prefix)
            .map_err(read_error)?;

        let complete = prefix.len() <= self.limit;
        prefix.truncate(self.limit);

        let sniffed = self.sniff_bytes(&prefix, complete);
        debug!(
            path = %path.display(),
            mime_type = %sniffed.mime_type,
            encoding = %sniffed.encoding,
            "Sniffed file"
        );
        Ok(sniffed)
    }
}

fn match_signature(data: &[u8]) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|(offset, magic, _)| {
            data.get(*offset..offset + magic.len())
                .is_some_and(|window| window == *magic)
        })
        .map(|(_, _, mime_type)| *mime_type)
}

fn match_text_signature(data: &[u8]) -> &'static str {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let head = &data[start..];

    TEXT_SIGNATURES
        .iter()
        .find(|(token, _)| {
            head.get(..token.len())
                .is_some_and(|h| h.eq_ignore_ascii_case(token.as_bytes()))
        })
        .map_or("text/plain", |(_, mime_type)| *mime_type)
}

fn bom_encoding(data: &[u8]) -> Option<&'static str> {
    encoding_rs::Encoding::for_bom(data).map(|(encoding, _)| match encoding.name() {
        "UTF-16LE" => "utf-16le",
        "UTF-16BE" => "utf-16be",
        _ => "utf-8",
    })
}

// Bytes that never occur in text: C0 controls other than BEL, BS, TAB, LF, VT, FF, CR, ESC; and DEL
const fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x06 | 0x0e..=0x1a | 0x1c..=0x1f | 0x7f)
}

/// Text encoding name, or `None` when the bytes do not look like text
fn text_encoding(data: &[u8], complete: bool) -> Option<&'static str> {
    if data.iter().copied().any(is_binary_byte) {
        return None;
    }

    if data.is_ascii() {
        return Some("us-ascii");
    }

    match std::str::from_utf8(data) {
        Ok(_) => return Some("utf-8"),
        // A multi-byte sequence split by the prefix cut
        Err(e) if e.error_len().is_none() && !complete => return Some("utf-8"),
        Err(_) => {}
    }

    // C1 controls rule out ISO-8859 text
    if data.iter().any(|b| (0x80..=0x9f).contains(b)) {
        Some("unknown-8bit")
    } else {
        Some("iso-8859-1")
    }
}
