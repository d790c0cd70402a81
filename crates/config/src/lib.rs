//! warcpipe - Config
//!
//! One TOML document selects how an archive session logs, frames records and
//! where the bytes go. Every section may be omitted; an empty document means
//! gzip-framed records collected in memory, logged at `info` to stderr.
//!
//! ```
//! use std::str::FromStr;
//! use warcpipe_config::{Config, SinkConfig};
//!
//! let config = Config::from_str("[codec]\ngzip = false").unwrap();
//! assert!(!config.codec.gzip);
//! assert!(matches!(config.sink, SinkConfig::Memory(_)));
//! ```
//!
//! A file-backed session:
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [codec]
//! software = "warcpipe/0.1"
//!
//! [sink]
//! type = "file"
//! path = "export.warc.gz"
//! error_log_interval = "30s"
//! ```

mod codec;
mod error;
mod logging;
mod sinks;
mod validation;

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use codec::CodecConfig;
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use sinks::{FileSinkConfig, MemorySinkConfig, SinkConfig};

/// Settings for one archive session
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,

    /// Record framing
    pub codec: CodecConfig,

    /// Where framed bytes are collected
    pub sink: SinkConfig,
}

impl Config {
    /// Read and validate a TOML file
    ///
    /// # Errors
    ///
    /// `ConfigError::Read` when the file is unreadable, otherwise whatever
    /// [`FromStr`] reports for its contents.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        validation::validate_config(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document() {
        let config = Config::from_str("").unwrap();
        assert!(config.codec.gzip);
        assert!(!config.codec.appending);
        assert_eq!(config.sink.type_name(), "memory");
        assert_eq!(config.log.directive(), "info");
    }

    #[test]
    fn test_file_session() {
        let config = Config::from_str(
            r#"
[log]
level = "debug"
format = "json"

[codec]
gzip = false
software = "warcpipe"

[sink]
type = "file"
path = "export.warc"
"#,
        )
        .unwrap();

        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.codec.software.as_deref(), Some("warcpipe"));
        let SinkConfig::File(file) = &config.sink else {
            panic!("expected file sink");
        };
        assert_eq!(file.path, Path::new("export.warc"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_str("[codec\ngzip = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_sink_type() {
        let err = Config::from_str("[sink]\ntype = \"s3\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_parse_validates() {
        let err = Config::from_str("[sink]\ntype = \"file\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "path", .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[codec]\nappending = true").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert!(config.codec.appending);
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
