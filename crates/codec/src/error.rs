//! Codec error types

use thiserror::Error;

/// Errors raised while framing a record
#[derive(Debug, Error)]
pub enum CodecError {
    /// Compression failed
    #[error("gzip framing failed: {0}")]
    Compression(#[from] std::io::Error),

    /// Target URI cannot be carried in a WARC header line
    #[error("invalid target URI {uri:?}: {reason}")]
    InvalidUri {
        /// Offending URI
        uri: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

impl CodecError {
    /// Create an invalid URI error
    pub fn invalid_uri(uri: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            reason,
        }
    }
}
