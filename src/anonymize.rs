//! Recipient redaction over raw message bytes

use memchr::memmem;
use tracing::debug;

/// Blanks out literal occurrences of recipient identities.
///
/// Matching is exact and case-sensitive. Each match is overwritten byte for
/// byte with the fill byte, so offsets and total length never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anonymizer {
    fill: u8,
}

impl Default for Anonymizer {
    fn default() -> Self {
        Self::new(b'X')
    }
}

impl Anonymizer {
    #[must_use]
    pub const fn new(fill: u8) -> Self {
        Self { fill }
    }

    /// Redact every address, then every non-empty display name, across the whole buffer
    #[must_use]
    pub fn redact(&self, raw: &[u8], addresses: &[&str], display_names: &[&str]) -> Vec<u8> {
        let mut redacted = raw.to_vec();

        for target in addresses.iter().chain(display_names) {
            if target.is_empty() {
                continue;
            }
            let count = self.redact_literal(&mut redacted, target);
            debug!(occurrences = count, len = target.len(), "Redacted recipient");
        }

        redacted
    }

    fn redact_literal(&self, buf: &mut [u8], needle: &str) -> usize {
        let spans: Vec<usize> = memmem::find_iter(buf, needle.as_bytes()).collect();
        for &start in &spans {
            buf[start..start + needle.len()].fill(self.fill);
        }

        spans.len()
    }
}
