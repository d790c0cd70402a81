//! Archive writer
//!
//! Drives one archive-writing session: pulls stored transactions one at a
//! time, synthesizes their records, hands them to the codec and forwards the
//! framed bytes to the sink in iteration order.
//!
//! ```text
//! [Stream<StoredTransaction>] --> synthesize --> [RecordCodec] --Bytes--> [ByteSink] --> Artifact
//!                                     |
//!                                   Skip (logged)
//! ```
//!
//! Only an upstream read failure aborts a session. Skips, per-record codec
//! failures and sink rejections are logged and counted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use warcpipe_codec::{HttpPart, RecordCodec, WarcCodec};
use warcpipe_config::Config;
use warcpipe_sinks::{Artifact, ByteSink, MetricsSnapshot};

use crate::error::{ArchiveError, StoreError};
use crate::model::{RequestResponseInfo, StoredTransaction};
use crate::synth::{self, SkipReason, Synthesis, format_timestamp};

/// Counters for one archive-writing session
#[derive(Debug, Default)]
pub struct WriterMetrics {
    transactions_read: AtomicU64,
    skipped_fuzzy: AtomicU64,
    skipped_scheme: AtomicU64,
    codec_failures: AtomicU64,
    response_records: AtomicU64,
    request_records: AtomicU64,
    bytes_forwarded: AtomicU64,
    sink_rejections: AtomicU64,
}

impl WriterMetrics {
    pub const fn new() -> Self {
        Self {
            transactions_read: AtomicU64::new(0),
            skipped_fuzzy: AtomicU64::new(0),
            skipped_scheme: AtomicU64::new(0),
            codec_failures: AtomicU64::new(0),
            response_records: AtomicU64::new(0),
            request_records: AtomicU64::new(0),
            bytes_forwarded: AtomicU64::new(0),
            sink_rejections: AtomicU64::new(0),
        }
    }

    #[inline]
    fn transaction_read(&self) {
        self.transactions_read.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn skipped(&self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::FuzzyMatch => &self.skipped_fuzzy,
            SkipReason::UnsupportedScheme => &self.skipped_scheme,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn codec_failure(&self) {
        self.codec_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn records(&self, paired: bool) {
        self.response_records.fetch_add(1, Ordering::Relaxed);
        if paired {
            self.request_records.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    fn forwarded(&self, bytes: u64) {
        self.bytes_forwarded.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    fn sink_rejection(&self) {
        self.sink_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WriterSnapshot {
        WriterSnapshot {
            transactions_read: self.transactions_read.load(Ordering::Relaxed),
            skipped_fuzzy: self.skipped_fuzzy.load(Ordering::Relaxed),
            skipped_scheme: self.skipped_scheme.load(Ordering::Relaxed),
            codec_failures: self.codec_failures.load(Ordering::Relaxed),
            response_records: self.response_records.load(Ordering::Relaxed),
            request_records: self.request_records.load(Ordering::Relaxed),
            bytes_forwarded: self.bytes_forwarded.load(Ordering::Relaxed),
            sink_rejections: self.sink_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of writer metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterSnapshot {
    pub transactions_read: u64,
    pub skipped_fuzzy: u64,
    pub skipped_scheme: u64,
    pub codec_failures: u64,
    pub response_records: u64,
    pub request_records: u64,
    pub bytes_forwarded: u64,
    pub sink_rejections: u64,
}

impl WriterSnapshot {
    /// Transactions that produced no records
    pub fn skipped(&self) -> u64 {
        self.skipped_fuzzy + self.skipped_scheme + self.codec_failures
    }
}

/// Result of a completed session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub artifact: Artifact,
    pub writer: WriterSnapshot,
    pub sink: MetricsSnapshot,
}

/// Writes stored transactions into a WARC archive
///
/// One writer owns one sink for the whole session; `&mut self` on every
/// write keeps byte order equal to call order.
pub struct ArchiveWriter<C, S> {
    codec: C,
    sink: S,
    metrics: Arc<WriterMetrics>,
    /// Leading warcinfo record already emitted (or not wanted)
    started: bool,
}

impl ArchiveWriter<WarcCodec, Box<dyn ByteSink>> {
    /// Build the codec and sink selected by `config`
    pub async fn from_config(config: &Config) -> Result<Self, ArchiveError> {
        let codec = WarcCodec::from_config(&config.codec);
        let sink = warcpipe_sinks::from_config(&config.sink).await?;
        tracing::debug!(
            sink = config.sink.type_name(),
            gzip = config.codec.gzip,
            "archive writer configured"
        );
        Ok(Self::new(codec, sink))
    }
}

impl<C: RecordCodec, S: ByteSink> ArchiveWriter<C, S> {
    pub fn new(codec: C, sink: S) -> Self {
        Self {
            codec,
            sink,
            metrics: Arc::new(WriterMetrics::new()),
            started: false,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Shared handle to the session counters
    pub fn metrics(&self) -> Arc<WriterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Write every transaction from `transactions`, then finish the sink
    ///
    /// Items are awaited strictly one after another.
    ///
    /// # Errors
    ///
    /// A store error aborts the session immediately; bytes written for earlier
    /// transactions stay in the (unfinished) sink and can be salvaged with
    /// [`finish`](Self::finish).
    pub async fn write_all<T>(&mut self, transactions: T) -> Result<WriteOutcome, ArchiveError>
    where
        T: Stream<Item = Result<StoredTransaction, StoreError>>,
    {
        tracing::info!("archive session starting");
        let mut transactions = std::pin::pin!(transactions);

        while let Some(item) = transactions.next().await {
            let tx = match item {
                Ok(tx) => tx,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        transactions = self.metrics.snapshot().transactions_read,
                        "transaction store failed, archive incomplete"
                    );
                    return Err(e.into());
                }
            };
            self.write_transaction(&tx)?;
        }

        self.finish().await
    }

    /// Write the records for one stored transaction
    ///
    /// Returns false when the transaction was skipped. Codec failures are
    /// logged and count as a skip.
    pub fn write_transaction(&mut self, tx: &StoredTransaction) -> Result<bool, ArchiveError> {
        self.metrics.transaction_read();

        let (info, payload) = match synth::synthesize(tx) {
            Synthesis::Record { info, payload } => (info, payload),
            Synthesis::Skip(reason) => {
                self.metrics.skipped(reason);
                tracing::debug!(url = %tx.url, reason = %reason, "skipping transaction");
                return Ok(false);
            }
        };

        self.ensure_started()?;
        match self.emit(&info, &payload) {
            Ok(bytes) => {
                self.forward(bytes);
                Ok(true)
            }
            Err(e) => {
                self.metrics.codec_failure();
                tracing::warn!(url = %tx.url, error = %e, "record framing failed, skipping");
                Ok(false)
            }
        }
    }

    /// Write one already-synthesized record outside the bulk path
    ///
    /// A `None` payload is written as an empty body.
    pub fn write_one(
        &mut self,
        info: &RequestResponseInfo,
        payload: Option<Bytes>,
    ) -> Result<(), ArchiveError> {
        let payload = payload.unwrap_or_default();

        self.ensure_started()?;
        let bytes = self.emit(info, &payload)?;
        self.forward(bytes);
        Ok(())
    }

    /// Finish the sink and return the artifact
    pub async fn finish(&mut self) -> Result<WriteOutcome, ArchiveError> {
        let artifact = self.sink.finish().await?;
        let writer = self.metrics.snapshot();
        let sink = self.sink.metrics();

        if !artifact.warnings().is_empty() {
            tracing::warn!(
                warnings = artifact.warnings().len(),
                "archive finished with sink write failures"
            );
        }
        tracing::info!(
            transactions = writer.transactions_read,
            skipped = writer.skipped(),
            responses = writer.response_records,
            requests = writer.request_records,
            bytes = artifact.len(),
            "archive session finished"
        );

        Ok(WriteOutcome {
            artifact,
            writer,
            sink,
        })
    }

    /// Frame `info` as a request+response pair or a lone response
    fn emit(&self, info: &RequestResponseInfo, payload: &[u8]) -> Result<Bytes, ArchiveError> {
        let bytes = if info.has_request() {
            self.codec.emit_request_response_records(
                &info.url,
                &info.date,
                HttpPart::new(&info.request_headers, &info.post_data),
                HttpPart::new(&info.response_headers, payload),
            )?
        } else {
            self.codec
                .emit_response_record(&info.url, &info.date, &info.response_headers, payload)?
        };
        self.metrics.records(info.has_request());
        Ok(bytes)
    }

    /// Emit the leading warcinfo record before the first real record
    fn ensure_started(&mut self) -> Result<(), ArchiveError> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        if let Some(bytes) = self.codec.emit_warcinfo(&format_timestamp(&Utc::now()))? {
            self.forward(bytes);
        }
        Ok(())
    }

    fn forward(&mut self, bytes: Bytes) {
        let size = bytes.len() as u64;
        if self.sink.write(bytes) {
            self.metrics.forwarded(size);
            tracing::trace!(bytes = size, total = self.sink.len(), "forwarded to sink");
        } else {
            self.metrics.sink_rejection();
            tracing::warn!(bytes = size, "sink rejected record bytes");
        }
    }
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
