//! warcpipe - Sinks
//!
//! Append-only destinations for framed archive bytes.
//!
//! # Architecture
//!
//! Both strategies implement [`ByteSink`]: `write` accepts a chunk without
//! blocking, `finish` flushes and yields the [`Artifact`]. Which one is used
//! is decided once, when the archive-writing session starts.
//!
//! ```text
//! [ArchiveWriter] --Bytes--> [ByteSink] --> MemorySink   --> Artifact::Blob
//!                                       \-> ExternalSink --> VirtualWriter --> Artifact::VirtualFile
//! ```
//!
//! # Available Sinks
//!
//! | Sink | Destination | Backpressure |
//! |------|-------------|--------------|
//! | `memory` | `Vec<Bytes>`, concatenated on finish | None (memory bound) |
//! | `external` | any `VirtualWriter` (e.g. `FileWriter`) | Queue, one chunk in flight |

/// Memory sink - whole archive as one blob
pub mod memory;

/// External sink - queued delivery to a `VirtualWriter`
pub mod external;

/// Shared utilities (rate-limited logging)
pub mod util;

/// Common types shared by all sinks (errors, metrics)
mod common;

/// The `ByteSink` capability and `Artifact`
mod sink;

pub use common::{MetricsSnapshot, SinkError, SinkMetrics};
pub use external::{ExternalSink, FileWriter, VirtualWriter};
pub use memory::MemorySink;
pub use sink::{Artifact, ByteSink, OCTET_STREAM};

use warcpipe_config::SinkConfig;

/// Build the sink strategy selected by `config`
///
/// File sinks create their output file and must be built inside a tokio
/// runtime.
pub async fn from_config(config: &SinkConfig) -> Result<Box<dyn ByteSink>, SinkError> {
    match config {
        SinkConfig::Memory(memory) => Ok(Box::new(MemorySink::from_config(memory))),
        SinkConfig::File(file) => Ok(Box::new(ExternalSink::from_config(file).await?)),
    }
}
