// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Email Forensics
//!
//! Extracts indicators of compromise from raw email messages and the
//! attachments carved out of them.
//!
//! # Features
//!
//! - Leaf-by-leaf enumeration of decoded MIME bodies
//! - Link extraction from HTML anchors and plain-text URLs
//! - URL validation with exact-value de-duplication
//! - Length-preserving redaction of recipient addresses and names
//! - MD5, SHA-1, SHA-256 and SHA-512 fingerprints in one streaming pass
//! - Content-based MIME type and text encoding detection
//!
//! # Example
//!
//! ```no_run
//! use eml_forensics::{Attachment, Message};
//!
//! let message = Message::open("samples/phish.eml").unwrap();
//! for url in message.urls() {
//!     println!("{url}");
//! }
//! let shareable = message.anonymize();
//!
//! let record = Attachment::new("samples/invoice.pdf").to_record().unwrap();
//! println!("{}", record.to_json().unwrap());
//! ```

mod anonymize;
mod attachment;
mod config;
mod digest;
mod error;
mod links;
mod message;
mod parser;
mod scan;
mod sniff;

pub use anonymize::Anonymizer;
pub use attachment::{Attachment, AttachmentIdentifier, DigestRecord};
pub use config::ExtractorConfig;
pub use digest::{DigestEngine, Digests, StreamingDigest, file_hexdigest};
pub use error::{Error, Result};
pub use links::{
    HtmlParser, LinkExtractor, LolHtmlParser, ValidUrl, normalize_url, scan_plain_text,
};
pub use message::{Bodies, BodyPart, Message, MessageLoader};
pub use parser::{Headers, MailParser, MimeParser, MimePart, ParsedMessage, Recipient, sub_type};
pub use scan::{MalwareScanner, NoScanner};
pub use sniff::{BINARY, ContentSniffer, MagicSniffer, OCTET_STREAM, Sniffed};
