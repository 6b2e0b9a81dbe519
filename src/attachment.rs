//! Attachment fingerprinting and type identification

use crate::config::ExtractorConfig;
use crate::digest::{DigestEngine, Digests, StreamingDigest, file_hexdigest};
use crate::error::{Error, Result};
use crate::scan::{MalwareScanner, NoScanner};
use crate::sniff::{ContentSniffer, MagicSniffer, Sniffed};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// An extracted attachment on disk.
///
/// Holds no parsed state: every query reads the file again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    path: PathBuf,
    name: String,
}

impl Attachment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the file
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn md5(&self) -> Result<String> {
        self.hexdigest::<Md5>()
    }

    pub fn sha1(&self) -> Result<String> {
        self.hexdigest::<Sha1>()
    }

    pub fn sha256(&self) -> Result<String> {
        self.hexdigest::<Sha256>()
    }

    pub fn sha512(&self) -> Result<String> {
        self.hexdigest::<Sha512>()
    }

    pub fn mime_type(&self) -> Result<String> {
        MagicSniffer::default().sniff(&self.path).map(|s| s.mime_type)
    }

    pub fn encoding(&self) -> Result<String> {
        MagicSniffer::default().sniff(&self.path).map(|s| s.encoding)
    }

    /// Reserved; no scanning backend is wired in
    pub fn clamav(&self) -> Result<Option<String>> {
        NoScanner.scan(&self.path)
    }

    /// Full metadata with the default digest engine and sniffer
    pub fn to_record(&self) -> Result<DigestRecord> {
        AttachmentIdentifier::new(&ExtractorConfig::default()).identify(self)
    }

    fn hexdigest<D: sha2::Digest>(&self) -> Result<String> {
        file_hexdigest::<D>(&self.path).map_err(|source| Error::AttachmentRead {
            path: self.path.clone(),
            source,
        })
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Fingerprints and content type of one attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestRecord {
    pub name: String,
    #[serde(flatten)]
    pub digests: Digests,
    #[serde(flatten)]
    pub sniffed: Sniffed,
}

impl DigestRecord {
    /// Flat field-name to value mapping
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        [
            ("name", &self.name),
            ("md5", &self.digests.md5),
            ("sha1", &self.digests.sha1),
            ("sha256", &self.digests.sha256),
            ("sha512", &self.digests.sha512),
            ("mime_type", &self.sniffed.mime_type),
            ("encoding", &self.sniffed.encoding),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_map())
    }
}

/// Combines a [`DigestEngine`], a [`ContentSniffer`] and a [`MalwareScanner`].
///
/// Digesting and sniffing fail independently; call them separately to keep
/// one result when the other fails.
#[derive(Debug, Clone, Default)]
pub struct AttachmentIdentifier<D = StreamingDigest, S = MagicSniffer, M = NoScanner> {
    digest: D,
    sniffer: S,
    scanner: M,
}

impl AttachmentIdentifier {
    #[must_use]
    pub fn new(config: &ExtractorConfig) -> Self {
        Self::with_parts(StreamingDigest::new(config), MagicSniffer::new(config), NoScanner)
    }
}

impl<D: DigestEngine, S: ContentSniffer, M: MalwareScanner> AttachmentIdentifier<D, S, M> {
    pub const fn with_parts(digest: D, sniffer: S, scanner: M) -> Self {
        Self {
            digest,
            sniffer,
            scanner,
        }
    }

    pub fn digests(&self, attachment: &Attachment) -> Result<Digests> {
        self.digest.digest(attachment.path())
    }

    pub fn sniff(&self, attachment: &Attachment) -> Result<Sniffed> {
        self.sniffer.sniff(attachment.path())
    }

    pub fn scan(&self, attachment: &Attachment) -> Result<Option<String>> {
        self.scanner.scan(attachment.path())
    }

    /// Digest and sniff the attachment, failing if either does
    pub fn identify(&self, attachment: &Attachment) -> Result<DigestRecord> {
        Ok(DigestRecord {
            name: attachment.name().to_string(),
            digests: self.digests(attachment)?,
            sniffed: self.sniff(attachment)?,
        })
    }
}
