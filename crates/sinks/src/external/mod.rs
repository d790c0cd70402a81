//! External sink - streams the archive through a `VirtualWriter`
//!
//! Used when the archive is too large to hold in memory. Chunks are queued
//! and a single drain task hands them to the writer one at a time, awaiting
//! each completion before starting the next.
//!
//! # Architecture
//!
//! ```text
//! [write()] --Bytes--> [unbounded queue] --> [drain task] --> [VirtualWriter]
//!                                                  |
//!                                     drained counter / warnings
//! ```
//!
//! Writer failures do not stop the session. Each one is logged (rate-limited),
//! counted, and recorded as a warning on the final artifact; the next chunk is
//! still attempted.
//!
//! # Example
//!
//! ```ignore
//! use warcpipe_sinks::{ByteSink, ExternalSink, FileWriter};
//!
//! let writer = FileWriter::create("export.warc.gz").await?;
//! let mut sink = ExternalSink::new(writer);
//! sink.write(record_bytes);
//! let artifact = sink.finish().await?;
//! ```

mod file;

pub use file::FileWriter;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use warcpipe_config::FileSinkConfig;

use crate::common::{MetricsSnapshot, SinkError, SinkMetrics};
use crate::sink::{Artifact, ByteSink};
use crate::util::{DEFAULT_LOG_INTERVAL, RateLimitedLogger};

/// Destination driven by an `ExternalSink`
///
/// Only one `write` is ever in flight.
#[async_trait]
pub trait VirtualWriter: Send + 'static {
    /// Store one chunk
    async fn write(&mut self, chunk: Bytes) -> io::Result<()>;

    /// Bytes stored so far
    fn length(&self) -> u64;

    /// Name of the destination (e.g. file path)
    fn name(&self) -> &str;

    /// Commit the destination once all chunks are written
    async fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// What the drain task hands back when the queue closes
struct DrainOutcome {
    name: String,
    length: u64,
    warnings: Vec<String>,
}

/// Byte sink backed by an external writer
pub struct ExternalSink {
    name: String,

    /// Queue sender; `None` once finished
    sender: Option<mpsc::UnboundedSender<Bytes>>,

    /// Drain task handle; `None` once finished
    task: Option<JoinHandle<DrainOutcome>>,

    /// Bytes accepted by `write`
    accepted: u64,

    drained: watch::Receiver<u64>,

    metrics: Arc<SinkMetrics>,
}

impl ExternalSink {
    /// Wrap a writer and start its drain task
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<W: VirtualWriter>(writer: W) -> Self {
        Self::with_log_interval(writer, DEFAULT_LOG_INTERVAL)
    }

    /// Like `new`, with a custom interval between repeated writer error logs
    pub fn with_log_interval<W: VirtualWriter>(writer: W, log_interval: Duration) -> Self {
        let name = writer.name().to_string();
        let (sender, receiver) = mpsc::unbounded_channel();
        let (drained_tx, drained) = watch::channel(0);
        let metrics = Arc::new(SinkMetrics::new());
        let logger = RateLimitedLogger::new(log_interval);

        tracing::info!(sink = %name, "external sink starting");

        let task = tokio::spawn(run_drain_task(
            writer,
            receiver,
            drained_tx,
            Arc::clone(&metrics),
            logger,
        ));

        Self {
            name,
            sender: Some(sender),
            task: Some(task),
            accepted: 0,
            drained,
            metrics,
        }
    }

    /// Create the file named by `config` and stream into it
    pub async fn from_config(config: &FileSinkConfig) -> Result<Self, SinkError> {
        let writer = FileWriter::create(&config.path).await.map_err(|e| {
            SinkError::init(format!("cannot create {}: {e}", config.path.display()))
        })?;
        Ok(Self::with_log_interval(writer, config.error_log_interval))
    }

    /// Destination name
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ByteSink for ExternalSink {
    fn write(&mut self, chunk: Bytes) -> bool {
        let Some(sender) = self.sender.as_ref() else {
            self.metrics.write_rejected();
            tracing::warn!(sink = %self.name, bytes = chunk.len(), "write after finish ignored");
            return false;
        };

        let size = chunk.len() as u64;
        if sender.send(chunk).is_err() {
            // Drain task is gone (panicked); nothing downstream will store it
            self.metrics.write_rejected();
            tracing::error!(sink = %self.name, bytes = size, "drain task stopped, chunk rejected");
            return false;
        }

        self.accepted += size;
        self.metrics.chunk_received(size);
        true
    }

    fn len(&self) -> u64 {
        self.accepted
    }

    fn drained(&self) -> watch::Receiver<u64> {
        self.drained.clone()
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn finish(&mut self) -> Result<Artifact, SinkError> {
        let (Some(sender), Some(task)) = (self.sender.take(), self.task.take()) else {
            return Err(SinkError::AlreadyFinished);
        };

        // Closing the queue lets the drain task flush the rest and exit
        drop(sender);
        let outcome = task
            .await
            .map_err(|e| SinkError::drain_task(e.to_string()))?;

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            sink = %outcome.name,
            chunks = snapshot.chunks_written,
            bytes = outcome.length,
            write_errors = snapshot.write_errors,
            "external sink finished"
        );

        Ok(Artifact::VirtualFile {
            name: outcome.name,
            length: outcome.length,
            warnings: outcome.warnings,
        })
    }
}

/// Hand queued chunks to the writer one at a time until the queue closes
async fn run_drain_task<W: VirtualWriter>(
    mut writer: W,
    mut receiver: mpsc::UnboundedReceiver<Bytes>,
    drained: watch::Sender<u64>,
    metrics: Arc<SinkMetrics>,
    logger: RateLimitedLogger,
) -> DrainOutcome {
    let mut warnings = Vec::new();
    let mut processed: u64 = 0;

    while let Some(chunk) = receiver.recv().await {
        let size = chunk.len() as u64;

        match writer.write(chunk).await {
            Ok(()) => {
                metrics.chunk_written(size);
                tracing::trace!(sink = %writer.name(), bytes = size, "chunk written");
            }
            Err(e) => {
                metrics.write_error();
                logger.warn(writer.name(), &e);
                warnings.push(format!("write of {size} bytes failed: {e}"));
            }
        }

        processed += size;
        drained.send_replace(processed);
    }

    if let Err(e) = writer.close().await {
        metrics.write_error();
        tracing::warn!(sink = %writer.name(), error = %e, "closing writer failed");
        warnings.push(format!("close failed: {e}"));
    }

    DrainOutcome {
        name: writer.name().to_string(),
        length: writer.length(),
        warnings,
    }
}
