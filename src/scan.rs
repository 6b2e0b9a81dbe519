//! Malware scanning capability

use crate::error::{Error, Result};
use std::path::Path;

/// A malware scanning backend.
///
/// The provided `scan` reports the capability as unavailable, so a backend
/// only overrides it once it can actually scan.
pub trait MalwareScanner {
    /// Signature name of the detected threat, `None` when the file is clean
    fn scan(&self, path: &Path) -> Result<Option<String>> {
        let _ = path;
        Err(Error::Unsupported("malware scanning"))
    }
}

/// Placeholder scanner with no backend
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScanner;

impl MalwareScanner for NoScanner {}
