//! Memory sink - accumulates the archive in RAM
//!
//! Every accepted chunk is kept as-is (a refcounted `Bytes`, no copy) in an
//! ordered list. `finish` concatenates the list once into the final blob.
//! Capacity is bounded only by available memory, so `write` never pushes
//! back; a drain notification is published after each accepted chunk.
//!
//! # Example
//!
//! ```ignore
//! use warcpipe_sinks::{ByteSink, MemorySink};
//!
//! let mut sink = MemorySink::new();
//! sink.write(record_bytes);
//! let artifact = sink.finish().await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use tokio::sync::watch;
use warcpipe_config::MemorySinkConfig;

use crate::common::{MetricsSnapshot, SinkError, SinkMetrics};
use crate::sink::{Artifact, ByteSink};

/// In-memory byte sink
pub struct MemorySink {
    /// Accepted chunks in arrival order
    chunks: Vec<Bytes>,

    /// Running sum of chunk sizes
    len: u64,

    finished: bool,

    drained: watch::Sender<u64>,

    metrics: Arc<SinkMetrics>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Reserve room for `chunks` chunks up front
    pub fn with_capacity(chunks: usize) -> Self {
        let (drained, _) = watch::channel(0);
        Self {
            chunks: Vec::with_capacity(chunks),
            len: 0,
            finished: false,
            drained,
            metrics: Arc::new(SinkMetrics::new()),
        }
    }

    pub fn from_config(config: &MemorySinkConfig) -> Self {
        Self::with_capacity(config.initial_chunks)
    }

    /// Chunks accepted so far, in order
    pub fn chunks(&self) -> &[Bytes] {
        &self.chunks
    }

    /// Whether `finish` has run
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn concat(chunks: Vec<Bytes>, len: u64) -> Bytes {
        if chunks.len() == 1 {
            return chunks.into_iter().next().unwrap_or_default();
        }

        let mut out = BytesMut::with_capacity(len as usize);
        for chunk in chunks {
            out.put_slice(&chunk);
        }
        out.freeze()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ByteSink for MemorySink {
    fn write(&mut self, chunk: Bytes) -> bool {
        if self.finished {
            self.metrics.write_rejected();
            tracing::warn!(bytes = chunk.len(), "write after finish ignored");
            return false;
        }

        let size = chunk.len() as u64;
        self.len += size;
        self.chunks.push(chunk);

        self.metrics.chunk_received(size);
        self.metrics.chunk_written(size);
        self.drained.send_replace(self.len);
        true
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn drained(&self) -> watch::Receiver<u64> {
        self.drained.subscribe()
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn finish(&mut self) -> Result<Artifact, SinkError> {
        if self.finished {
            return Err(SinkError::AlreadyFinished);
        }
        self.finished = true;

        let chunks = std::mem::take(&mut self.chunks);
        let count = chunks.len();
        let bytes = Self::concat(chunks, self.len);

        tracing::debug!(chunks = count, bytes = bytes.len(), "memory sink finished");
        Ok(Artifact::blob(bytes))
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;
