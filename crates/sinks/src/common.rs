//! Counters and errors shared by the memory and external sinks

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Per-sink counters, updated lock-free from `write` and the drain task
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Chunks accepted by `write`
    pub chunks_received: AtomicU64,

    /// Bytes accepted by `write`
    pub bytes_received: AtomicU64,

    /// Chunks delivered to the destination
    pub chunks_written: AtomicU64,

    /// Bytes delivered to the destination
    pub bytes_written: AtomicU64,

    /// Chunks the destination failed to store
    pub write_errors: AtomicU64,

    /// Writes refused because the sink was already finished
    pub rejected_writes: AtomicU64,
}

impl SinkMetrics {
    pub const fn new() -> Self {
        Self {
            chunks_received: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            chunks_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            rejected_writes: AtomicU64::new(0),
        }
    }

    /// Record an accepted chunk
    #[inline]
    pub fn chunk_received(&self, bytes: u64) {
        self.chunks_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a chunk delivered to the destination
    #[inline]
    pub fn chunk_written(&self, bytes: u64) {
        self.chunks_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a destination write error
    #[inline]
    pub fn write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a write refused after finish
    #[inline]
    pub fn write_rejected(&self) {
        self.rejected_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            chunks_received: self.chunks_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            chunks_written: self.chunks_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            rejected_writes: self.rejected_writes.load(Ordering::Relaxed),
        }
    }
}

/// Copy of the counters at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub chunks_received: u64,
    pub bytes_received: u64,
    pub chunks_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
    pub rejected_writes: u64,
}

/// Failures a sink reports to its owner
#[derive(Debug, Error)]
pub enum SinkError {
    /// Destination could not be opened
    #[error("cannot open sink destination: {0}")]
    Init(String),

    /// `finish` was called a second time
    #[error("sink already finished")]
    AlreadyFinished,

    /// The background drain task stopped abnormally
    #[error("drain task failed: {0}")]
    DrainTask(String),

    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    pub fn drain_task(msg: impl Into<String>) -> Self {
        Self::DrainTask(msg.into())
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod common_test;
