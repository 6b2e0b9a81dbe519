//! Error types for message loading and attachment identification

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading messages or identifying attachments
#[derive(Error, Debug)]
pub enum Error {
    /// The raw message file could not be read
    #[error("Failed to read message {}: {source}", path.display())]
    MessageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The MIME parser rejected the message structure
    #[error("Failed to parse message structure: {0}")]
    Structure(String),

    /// Invalid header format
    #[error("Invalid header format for {header}: {details}")]
    InvalidHeader { header: String, details: String },

    /// The attachment file could not be opened or read
    #[error("Failed to read attachment {}: {source}", path.display())]
    AttachmentRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// HTML could not be tokenized
    #[error("Failed to parse HTML: {0}")]
    Html(String),

    /// The requested capability has no backend
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

impl Error {
    /// True for failures that make a message unloadable
    #[must_use]
    pub const fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::MessageRead { .. } | Self::Structure(_) | Self::InvalidHeader { .. }
        )
    }

    #[must_use]
    pub const fn is_attachment_read_error(&self) -> bool {
        matches!(self, Self::AttachmentRead { .. })
    }

    /// True when a capability is unavailable rather than failed
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, Error>;
