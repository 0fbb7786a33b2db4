//! Error types for the blobstage library.

use thiserror::Error;

/// Main error type for resolution and bootstrap operations.
///
/// Archive-parse failures are deliberately absent: bytes that do not form a
/// valid archive are recovered locally into the image fallback and never
/// reach the caller as an error.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure reaching the blob store
    #[error("network error: {source}")]
    Network {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Blob store answered with a non-success HTTP status
    #[error("blob fetch failed: HTTP status {status}")]
    Fetch { status: u16 },

    /// A required build entry could not be read out of the archive
    #[error("failed to read build entry '{name}': {reason}")]
    ArchiveEntry { name: String, reason: String },

    /// The external game runtime rejected initialization
    #[error("runtime initialization failed: {0}")]
    RuntimeInit(String),

    /// Content identifiers must be non-empty
    #[error("content identifier must not be empty")]
    EmptyIdentifier,

    /// The resolver session worker is no longer running
    #[error("resolver session is closed")]
    SessionClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an arbitrary transport failure as a network error.
    pub fn network(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Network { source: Box::new(source) }
    }

    /// Create an archive-entry error.
    pub fn archive_entry(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArchiveEntry { name: name.into(), reason: reason.into() }
    }
}

/// Result type alias for blobstage operations.
pub type Result<T> = std::result::Result<T, Error>;
