//! Sink configuration types
//!
//! Selects where framed archive bytes accumulate. Exactly one strategy is
//! chosen per archive-writing session.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Byte sink strategy
///
/// # Example
///
/// ```toml
/// [sink]
/// type = "file"
/// path = "crawl.warc.gz"
/// error_log_interval = "5s"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    /// Accumulate in memory and produce a blob
    Memory(MemorySinkConfig),

    /// Stream to a file through the external-writer strategy
    File(FileSinkConfig),
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::Memory(MemorySinkConfig::default())
    }
}

impl SinkConfig {
    /// Get the sink type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::File(_) => "file",
        }
    }
}

/// In-memory sink configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MemorySinkConfig {
    /// Chunk list capacity reserved up front
    pub initial_chunks: usize,
}

/// File sink configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileSinkConfig {
    /// Output file path (required)
    pub path: PathBuf,

    /// Minimum interval between repeated writer error logs
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub error_log_interval: Duration,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            error_log_interval: Duration::from_secs(10),
        }
    }
}
