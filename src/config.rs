//! Extraction settings

use serde::{Deserialize, Serialize};

/// Tunables shared by the message and attachment pipelines.
///
/// The limits are unset by default, so nothing is bounded unless the caller
/// asks for it. Mail is untrusted input; callers processing it in bulk should
/// set `max_depth` and `max_body_bytes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Byte written over every redacted span
    pub fill_byte: u8,

    /// Deepest MIME nesting level that is traversed (root is depth 0)
    pub max_depth: Option<usize>,

    /// Decoded bodies larger than this are not scanned for links
    pub max_body_bytes: Option<usize>,

    /// Chunk size used when streaming files through the digests
    pub read_buffer_size: usize,

    /// Number of leading bytes inspected by the content sniffer
    pub sniff_bytes: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fill_byte: b'X',
            max_depth: None,
            max_body_bytes: None,
            read_buffer_size: 64 * 1024,
            sniff_bytes: 64 * 1024,
        }
    }
}

impl ExtractorConfig {
    /// Load settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
