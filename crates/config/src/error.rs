//! Config loading errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Why a configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML file could not be read
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Not valid TOML, or does not match the config schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting required by the chosen section variant is absent
    #[error("[{section}] requires `{field}`")]
    Missing {
        section: &'static str,
        field: &'static str,
    },

    /// A setting is present but unusable
    #[error("[{section}] `{field}` {reason}")]
    Invalid {
        section: &'static str,
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub fn missing(section: &'static str, field: &'static str) -> Self {
        Self::Missing { section, field }
    }

    pub fn invalid(section: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            section,
            field,
            reason: reason.into(),
        }
    }
}
