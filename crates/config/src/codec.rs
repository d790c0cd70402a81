//! Codec configuration
//!
//! Controls how records are framed before they reach the sink.

use serde::Deserialize;

/// WARC framing options
///
/// # Example
///
/// ```toml
/// [codec]
/// gzip = true
/// appending = false
/// software = "warcpipe 0.1"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CodecConfig {
    /// Compress each record as its own gzip member
    /// Default: true
    pub gzip: bool,

    /// Output continues an existing archive (no leading warcinfo record)
    /// Default: false
    pub appending: bool,

    /// Software name for the leading warcinfo record; none disables it
    pub software: Option<String>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            gzip: true,
            appending: false,
            software: None,
        }
    }
}
