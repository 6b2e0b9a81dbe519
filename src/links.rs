//! Link extraction from message bodies

use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use crate::message::BodyPart;
use crate::parser::sub_type;
use lol_html::{HtmlRewriter, Settings, element};
use regex::Regex;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

// Scheme is case-insensitive; the rest stops at characters that cannot appear in a URI
static URL_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r#"(?i:https?)://[^\s<>"'`\[\]{}|\\^]+"#).unwrap()
});

// Named and numeric character references; bare `&` never matches
static ENTITY_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap()
});

/// Extracts `href` values from HTML
pub trait HtmlParser {
    /// Every anchor `href`, in document order
    fn hrefs(&self, html: &str) -> Result<Vec<String>>;
}

/// Streaming [`HtmlParser`] built on `lol_html`
#[derive(Debug, Clone, Copy, Default)]
pub struct LolHtmlParser;

impl HtmlParser for LolHtmlParser {
    fn hrefs(&self, html: &str) -> Result<Vec<String>> {
        let mut hrefs = Vec::new();

        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!("a[href]", |el| {
                    if let Some(href) = el.get_attribute("href") {
                        hrefs.push(decode_entities(&href));
                    }
                    Ok(())
                })],
                ..Settings::default()
            },
            |_: &[u8]| {},
        );

        rewriter
            .write(html.as_bytes())
            .map_err(|e| Error::Html(e.to_string()))?;
        rewriter.end().map_err(|e| Error::Html(e.to_string()))?;

        Ok(hrefs)
    }
}

/// Decode each character reference on its own, leaving bare `&` and unknown
/// references as written
fn decode_entities(value: &str) -> String {
    ENTITY_REGEX
        .replace_all(value, |caps: &regex::Captures<'_>| {
            let entity = &caps[0];
            htmlescape::decode_html(entity).unwrap_or_else(|_| entity.to_string())
        })
        .into_owned()
}

/// Dispatches body parts to HTML or plain-text link scanning by MIME sub-type
#[derive(Debug, Clone, Default)]
pub struct LinkExtractor<H = LolHtmlParser> {
    html: H,
    config: ExtractorConfig,
}

impl LinkExtractor {
    #[must_use]
    pub const fn new(config: ExtractorConfig) -> Self {
        Self::with_html_parser(LolHtmlParser, config)
    }
}

impl<H: HtmlParser> LinkExtractor<H> {
    pub const fn with_html_parser(html: H, config: ExtractorConfig) -> Self {
        Self { html, config }
    }

    /// Raw links found in a single body
    #[must_use]
    pub fn extract(&self, part: BodyPart<'_>) -> Vec<String> {
        if let Some(limit) = self.config.max_body_bytes
            && part.body.len() > limit
        {
            warn!(
                content_type = part.content_type,
                size = part.body.len(),
                limit,
                "Body exceeds size limit, not scanning for links"
            );
            return Vec::new();
        }

        match sub_type(part.content_type).as_str() {
            "html" | "xhtml" => self.html.hrefs(part.body).unwrap_or_else(|e| {
                warn!(content_type = part.content_type, error = %e, "Skipping unparsable HTML body");
                Vec::new()
            }),
            "plain" => scan_plain_text(part.body),
            _ => Vec::new(),
        }
    }

    /// Raw links across all bodies, duplicates preserved
    pub fn each_link<'b, I>(&self, bodies: I) -> impl Iterator<Item = String>
    where
        I: IntoIterator<Item = BodyPart<'b>>,
    {
        bodies.into_iter().flat_map(|part| self.extract(part))
    }

    /// Links that survive URL validation, in extraction order
    pub fn each_url<'b, I>(&self, bodies: I) -> impl Iterator<Item = ValidUrl>
    where
        I: IntoIterator<Item = BodyPart<'b>>,
    {
        self.each_link(bodies).filter_map(ValidUrl::parse)
    }
}

/// `http`/`https` URLs in `text`, left to right
#[must_use]
pub fn scan_plain_text(text: &str) -> Vec<String> {
    URL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A raw link that parsed as a URL with a host.
///
/// Equality and hashing follow the link exactly as written, so
/// `http://a.test` and `HTTP://a.test/` stay distinct even though they parse
/// to the same [`Url`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidUrl {
    link: String,
    url: Url,
}

impl ValidUrl {
    /// Validate `link`, keeping its original text
    #[must_use]
    pub fn parse(link: String) -> Option<Self> {
        normalize_url(&link).map(|url| Self { link, url })
    }

    /// The link as extracted
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.link
    }

    /// Parsed components (scheme, host, path)
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for ValidUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.link)
    }
}

impl From<ValidUrl> for String {
    fn from(valid: ValidUrl) -> Self {
        valid.link
    }
}

/// Parse a raw link into a URL with an authority.
///
/// Links that fail to parse, or that have no host (`mailto:`, `javascript:`,
/// relative paths), are dropped.
#[must_use]
pub fn normalize_url(link: &str) -> Option<Url> {
    match Url::parse(link) {
        Ok(url) if url.host().is_some() => Some(url),
        Ok(_) => {
            debug!(link, "Dropping link without host");
            None
        }
        Err(e) => {
            debug!(link, error = %e, "Dropping malformed link");
            None
        }
    }
}
