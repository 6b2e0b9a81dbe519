//! Streaming file fingerprints

use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;
use tracing::debug;

/// Lowercase hex fingerprints of one file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digests {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    pub sha512: String,
}

/// Computes [`Digests`] for a file
pub trait DigestEngine {
    fn digest(&self, path: &Path) -> Result<Digests>;
}

/// Reads a file once in fixed-size chunks, feeding every chunk to all four hashers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingDigest {
    buffer_size: usize,
}

impl Default for StreamingDigest {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl StreamingDigest {
    #[must_use]
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            buffer_size: config.read_buffer_size.max(1),
        }
    }

    /// Digest everything `reader` yields until EOF
    pub fn digest_reader<R: Read>(&self, reader: R) -> io::Result<Digests> {
        let mut md5 = Md5::new();
        let mut sha1 = Sha1::new();
        let mut sha256 = Sha256::new();
        let mut sha512 = Sha512::new();

        self.for_each_chunk(reader, |chunk| {
            md5.update(chunk);
            sha1.update(chunk);
            sha256.update(chunk);
            sha512.update(chunk);
        })?;

        Ok(Digests {
            md5: hex::encode(md5.finalize()),
            sha1: hex::encode(sha1.finalize()),
            sha256: hex::encode(sha256.finalize()),
            sha512: hex::encode(sha512.finalize()),
        })
    }

    /// Hex digest of everything `reader` yields with a single algorithm
    pub fn hexdigest_reader<D: Digest, R: Read>(&self, reader: R) -> io::Result<String> {
        let mut hasher = D::new();
        self.for_each_chunk(reader, |chunk| hasher.update(chunk))?;
        Ok(hex::encode(hasher.finalize()))
    }

    fn for_each_chunk<R, F>(&self, mut reader: R, mut f: F) -> io::Result<()>
    where
        R: Read,
        F: FnMut(&[u8]),
    {
        let mut buf = vec![0u8; self.buffer_size];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => return Ok(()),
                Ok(n) => f(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}

impl DigestEngine for StreamingDigest {
    fn digest(&self, path: &Path) -> Result<Digests> {
        let digests = File::open(path)
            .and_then(|file| self.digest_reader(file))
            .map_err(|source| Error::AttachmentRead {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), sha256 = %digests.sha256, "Digested file");
        Ok(digests)
    }
}

/// Hex digest of a whole file with a single algorithm
pub fn file_hexdigest<D: Digest>(path: &Path) -> io::Result<String> {
    StreamingDigest::default().hexdigest_reader::<D, _>(File::open(path)?)
}
