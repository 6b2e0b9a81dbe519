//! MIME parsing facade
//!
//! The grammar itself belongs to `mailparse`; this module turns its borrowed
//! parse tree into an owned [`ParsedMessage`] exposing only the headers the
//! extraction pipeline reads.

use crate::error::{Error, Result};
use mailparse::body::Body;
use mailparse::{MailAddr, MailHeaderMap, ParsedMail};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Parses raw RFC 822 bytes into headers and a decoded body tree
pub trait MimeParser {
    fn parse(&self, raw: &[u8]) -> Result<ParsedMessage>;
}

/// [`MimeParser`] backed by `mailparse`
#[derive(Debug, Clone, Copy, Default)]
pub struct MailParser;

/// Output of a [`MimeParser`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub headers: Headers,
    pub root: MimePart,
}

/// Header fields the extraction pipeline depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    /// `To` recipients in header order, group members flattened
    pub to: Vec<Recipient>,

    /// Top-level content type, e.g. `multipart/alternative`
    pub content_type: String,
}

/// One mailbox from an address header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    pub display_name: Option<String>,
}

/// A node of the MIME body tree with its transfer-decoded content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart {
    pub content_type: String,
    pub body: String,
    pub children: Vec<MimePart>,
}

impl MimePart {
    /// A part with no nested parts
    #[must_use]
    pub fn leaf(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of parts in this subtree, including itself
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

impl MimeParser for MailParser {
    fn parse(&self, raw: &[u8]) -> Result<ParsedMessage> {
        let parsed = mailparse::parse_mail(raw).map_err(|e| Error::Structure(e.to_string()))?;

        let headers = Headers {
            to: extract_recipients(&parsed, "To")?,
            content_type: parsed.ctype.mimetype.clone(),
        };
        let root = convert_part(&parsed);

        Ok(ParsedMessage { headers, root })
    }
}

fn extract_recipients(parsed: &ParsedMail, header_name: &str) -> Result<Vec<Recipient>> {
    let Some(header) = parsed.headers.get_first_header(header_name) else {
        return Ok(Vec::new());
    };

    let list = mailparse::addrparse_header(header).map_err(|e| Error::InvalidHeader {
        header: header_name.into(),
        details: e.to_string(),
    })?;

    let mut recipients = Vec::new();
    for addr in &*list {
        match addr {
            MailAddr::Single(info) => recipients.push(Recipient {
                address: info.addr.clone(),
                display_name: info.display_name.clone(),
            }),
            MailAddr::Group(group) => {
                recipients.extend(group.addrs.iter().map(|info| Recipient {
                    address: info.addr.clone(),
                    display_name: info.display_name.clone(),
                }));
            }
        }
    }

    Ok(recipients)
}

fn convert_part(part: &ParsedMail) -> MimePart {
    MimePart {
        content_type: part.ctype.mimetype.clone(),
        body: decode_body(part),
        children: part.subparts.iter().map(convert_part).collect(),
    }
}

// A part whose transfer or charset decoding fails keeps its undecoded bytes
fn decode_body(part: &ParsedMail) -> String {
    match part.get_body() {
        Ok(body) => body,
        Err(e) => {
            warn!(
                content_type = %part.ctype.mimetype,
                error = %e,
                "Undecodable body, keeping raw content"
            );
            let encoded = part.get_body_encoded();
            let raw = match &encoded {
                Body::Base64(body) | Body::QuotedPrintable(body) => body.get_raw(),
                Body::SevenBit(body) | Body::EightBit(body) => body.get_raw(),
                Body::Binary(body) => body.get_raw(),
            };
            String::from_utf8_lossy(raw).into_owned()
        }
    }
}

/// MIME sub-type of a content type string (`text/html; charset=utf-8` → `html`).
///
/// Lowercased, with any structured-syntax suffix removed, so
/// `application/xhtml+xml` gives `xhtml`. Falls back to splitting on `/` when
/// the registry rejects the string, and yields an empty string when there is
/// no `/` at all.
#[must_use]
pub fn sub_type(content_type: &str) -> String {
    content_type.trim().parse::<::mime::Mime>().map_or_else(
        |_| {
            content_type
                .split_once('/')
                .map(|(_, rest)| {
                    let essence = rest.split(';').next().unwrap_or("");
                    essence.split('+').next().unwrap_or("").trim().to_lowercase()
                })
                .unwrap_or_default()
        },
        |m| m.subtype().as_str().to_lowercase(),
    )
}
