//! Byte sink capability and the artifact it produces

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::watch;

use crate::common::{MetricsSnapshot, SinkError};

/// Content type of an in-memory archive blob
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Finished archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Contiguous bytes held in memory
    Blob {
        bytes: Bytes,
        content_type: &'static str,
    },

    /// Bytes committed to a named file by an external writer
    VirtualFile {
        name: String,
        /// Bytes the writer reports as stored
        length: u64,
        /// Writer failures absorbed during the session, in order
        warnings: Vec<String>,
    },
}

impl Artifact {
    /// Wrap bytes as an octet-stream blob
    pub fn blob(bytes: Bytes) -> Self {
        Self::Blob {
            bytes,
            content_type: OCTET_STREAM,
        }
    }

    /// Size of the artifact in bytes
    pub fn len(&self) -> u64 {
        match self {
            Self::Blob { bytes, .. } => bytes.len() as u64,
            Self::VirtualFile { length, .. } => *length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blob contents, if this is an in-memory artifact
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Blob { bytes, .. } => Some(bytes),
            Self::VirtualFile { .. } => None,
        }
    }

    /// Writer failures absorbed while producing this artifact
    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Blob { .. } => &[],
            Self::VirtualFile { warnings, .. } => warnings,
        }
    }
}

/// Append-only destination for framed archive bytes
///
/// Chunks reach the destination in the order `write` was called, each one
/// whole. A sink belongs to one writer at a time (`&mut self`).
#[async_trait]
pub trait ByteSink: Send {
    /// Queue a chunk; returns false if the sink is already finished
    ///
    /// Acceptance does not mean the bytes are stored yet; only `finish`
    /// guarantees a full flush.
    fn write(&mut self, chunk: Bytes) -> bool;

    /// Bytes accepted so far
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain notifications: the number of accepted bytes the destination has
    /// finished processing. Changes after every completed chunk.
    fn drained(&self) -> watch::Receiver<u64>;

    /// Point-in-time metrics
    fn metrics(&self) -> MetricsSnapshot;

    /// Flush everything and produce the artifact
    ///
    /// # Errors
    ///
    /// `SinkError::AlreadyFinished` on a second call.
    async fn finish(&mut self) -> Result<Artifact, SinkError>;
}

#[async_trait]
impl<T: ByteSink + ?Sized> ByteSink for Box<T> {
    fn write(&mut self, chunk: Bytes) -> bool {
        (**self).write(chunk)
    }

    fn len(&self) -> u64 {
        (**self).len()
    }

    fn drained(&self) -> watch::Receiver<u64> {
        (**self).drained()
    }

    fn metrics(&self) -> MetricsSnapshot {
        (**self).metrics()
    }

    async fn finish(&mut self) -> Result<Artifact, SinkError> {
        (**self).finish().await
    }
}
