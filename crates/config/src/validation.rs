//! Configuration validation
//!
//! Validates config consistency:
//! - File sinks name an output path
//! - Rate-limit intervals are non-zero
//! - Codec software name is not blank when present

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::sinks::SinkConfig;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_sink(&config.sink)?;
    validate_codec(config)?;
    Ok(())
}

fn validate_sink(sink: &SinkConfig) -> Result<()> {
    match sink {
        SinkConfig::Memory(_) => Ok(()),
        SinkConfig::File(file) => {
            if file.path.as_os_str().is_empty() {
                return Err(ConfigError::missing("sink", "path"));
            }
            if file.error_log_interval.is_zero() {
                return Err(ConfigError::invalid(
                    "sink",
                    "error_log_interval",
                    "must be greater than zero",
                ));
            }
            Ok(())
        }
    }
}

fn validate_codec(config: &Config) -> Result<()> {
    if let Some(ref software) = config.codec.software
        && software.trim().is_empty()
    {
        return Err(ConfigError::invalid("codec", "software", "must not be blank"));
    }
    Ok(())
}
