//! Raw email messages and their body enumeration

use crate::anonymize::Anonymizer;
use crate::config::ExtractorConfig;
use crate::digest::file_hexdigest;
use crate::error::{Error, Result};
use crate::links::{LinkExtractor, ValidUrl};
use crate::parser::{Headers, MailParser, MimeParser, MimePart};
use md5::Md5;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Loads raw message files through a [`MimeParser`]
#[derive(Debug, Clone, Default)]
pub struct MessageLoader<P = MailParser> {
    parser: P,
    config: ExtractorConfig,
}

impl MessageLoader {
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_parser(MailParser, config)
    }
}

impl<P: MimeParser> MessageLoader<P> {
    pub const fn with_parser(parser: P, config: ExtractorConfig) -> Self {
        Self { parser, config }
    }

    /// Read and parse the message at `path`
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Message> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| Error::MessageRead {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse(path, raw)
    }

    /// Parse `raw` as though it had been read from `path`
    pub fn parse(&self, path: impl Into<PathBuf>, raw: Vec<u8>) -> Result<Message> {
        let path = path.into();
        let parsed = self.parser.parse(&raw)?;

        debug!(
            path = %path.display(),
            parts = parsed.root.count(),
            recipients = parsed.headers.to.len(),
            "Loaded message"
        );

        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .map(|n| n.strip_suffix(".eml").unwrap_or(&n).to_string())
            .unwrap_or_default();

        Ok(Message {
            path,
            directory,
            name,
            headers: parsed.headers,
            root: parsed.root,
            raw,
            config: self.config.clone(),
        })
    }
}

/// A parsed email message together with its original bytes.
///
/// Immutable once loaded. Bodies, links and URLs are derived on every call.
#[derive(Debug, Clone)]
pub struct Message {
    path: PathBuf,
    directory: PathBuf,
    name: String,
    headers: Headers,
    root: MimePart,
    raw: Vec<u8>,
    config: ExtractorConfig,
}

impl Message {
    /// Load a message with the default parser and settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        MessageLoader::new(ExtractorConfig::default()).load(path)
    }

    /// MD5 hex digest of a raw message file
    pub fn md5(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        file_hexdigest::<Md5>(path).map_err(|source| Error::MessageRead {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File name without the `.eml` suffix
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.headers.content_type
    }

    /// Recipient addresses from the `To` header
    #[must_use]
    pub fn to_addresses(&self) -> Vec<&str> {
        self.headers.to.iter().map(|r| r.address.as_str()).collect()
    }

    /// Display names from the `To` header; recipients without one are skipped
    #[must_use]
    pub fn to_display_names(&self) -> Vec<&str> {
        self.headers
            .to
            .iter()
            .filter_map(|r| r.display_name.as_deref())
            .collect()
    }

    /// Enumerate `(content-type, decoded body)` pairs.
    ///
    /// Multipart messages yield their leaf parts in document order; a message
    /// without nested parts yields itself once. Every call starts a fresh walk.
    #[must_use]
    pub fn bodies(&self) -> Bodies<'_> {
        Bodies::new(&self.root, self.config.max_depth)
    }

    /// Raw links in extraction order, duplicates included
    pub fn each_link(&self) -> impl Iterator<Item = String> + '_ {
        let extractor = LinkExtractor::new(self.config.clone());
        self.bodies().flat_map(move |part| extractor.extract(part))
    }

    /// Unique raw links
    #[must_use]
    pub fn links(&self) -> HashSet<String> {
        self.each_link().collect()
    }

    /// Links that parse as URLs, in extraction order
    pub fn each_url(&self) -> impl Iterator<Item = ValidUrl> + '_ {
        self.each_link().filter_map(ValidUrl::parse)
    }

    /// Unique URLs, compared by their link text
    #[must_use]
    pub fn urls(&self) -> HashSet<ValidUrl> {
        self.each_url().collect()
    }

    /// Copy of the raw message with every `To` address and display name blanked out
    #[must_use]
    pub fn anonymize(&self) -> Vec<u8> {
        Anonymizer::new(self.config.fill_byte).redact(
            &self.raw,
            &self.to_addresses(),
            &self.to_display_names(),
        )
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// One enumerated body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyPart<'a> {
    pub content_type: &'a str,
    pub body: &'a str,
}

/// Pre-order walk over the leaf parts of a MIME tree
#[derive(Debug, Clone)]
pub struct Bodies<'a> {
    stack: Vec<(&'a MimePart, usize)>,
    max_depth: Option<usize>,
}

impl<'a> Bodies<'a> {
    #[must_use]
    pub fn new(root: &'a MimePart, max_depth: Option<usize>) -> Self {
        Self {
            stack: vec![(root, 0)],
            max_depth,
        }
    }
}

impl<'a> Iterator for Bodies<'a> {
    type Item = BodyPart<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((part, depth)) = self.stack.pop() {
            if part.is_leaf() {
                return Some(BodyPart {
                    content_type: &part.content_type,
                    body: &part.body,
                });
            }

            if self.max_depth.is_some_and(|max| depth >= max) {
                warn!(
                    content_type = %part.content_type,
                    depth,
                    "Skipping nested parts beyond depth limit"
                );
                continue;
            }

            // Reversed so the first child is popped first
            self.stack
                .extend(part.children.iter().rev().map(|child| (child, depth + 1)));
        }

        None
    }
}
