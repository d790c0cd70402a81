//! Archive writer error types

use thiserror::Error;
use warcpipe_codec::CodecError;
use warcpipe_sinks::SinkError;

/// The transaction store failed to produce the next item
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading item `index` failed
    #[error("failed to read transaction {index}: {message}")]
    Read { index: usize, message: String },

    /// A stored dump could not be decoded
    #[error("failed to decode stored transactions: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn read(index: usize, message: impl Into<String>) -> Self {
        Self::Read {
            index,
            message: message.into(),
        }
    }
}

/// Errors returned by the archive writer
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Upstream read failure; the archive is incomplete
    #[error("transaction store error: {0}")]
    Store(#[from] StoreError),

    /// Framing failed for a single record
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Sink could not be built or finished
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// Logging could not be initialized
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl ArchiveError {
    pub fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}
