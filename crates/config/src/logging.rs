//! `[log]` section
//!
//! Controls how the archive writer reports skipped transactions, sink
//! errors and session summaries. The subscriber itself is installed by
//! `warcpipe_archive::init_logging`.

use std::fmt;

use serde::Deserialize;

/// Base verbosity
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every forwarded chunk
    Trace,
    /// One line per skipped transaction
    Debug,
    /// Session start and finish summaries
    #[default]
    Info,
    /// Sink rejections, codec and writer failures
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    /// One JSON object per event
    Json,
}

/// Where log lines go
///
/// `"stdout"` and `"stderr"` are keywords; any other string is a file path
/// opened in append mode.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    /// Keeps stdout free for archive bytes
    #[default]
    Stderr,
    #[serde(untagged)]
    File(String),
}

/// ```toml
/// [log]
/// level = "warn"
/// format = "json"
/// output = "/var/log/warcpipe.log"
/// filter = "warcpipe_sinks=debug"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,

    /// Extra `EnvFilter` directives, appended after `level`
    pub filter: Option<String>,
}

impl LogConfig {
    /// `EnvFilter` directive string: `level[,filter]`
    pub fn directive(&self) -> String {
        match self.filter.as_deref().map(str::trim) {
            Some(extra) if !extra.is_empty() => format!("{},{extra}", self.level),
            _ => self.level.to_string(),
        }
    }
}
