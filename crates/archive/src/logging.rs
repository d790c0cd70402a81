//! Tracing subscriber setup

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};
use warcpipe_config::{LogConfig, LogFormat, LogOutput};

use crate::error::ArchiveError;

/// Install the global subscriber described by `config`
///
/// An unparseable directive falls back to `info`. Fails if a global
/// subscriber is already set or the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> Result<(), ArchiveError> {
    let filter = build_filter(&config.directive())?;
    let writer = make_writer(&config.output)?;

    let layer = match config.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| ArchiveError::logging(e.to_string()))
}

fn build_filter(directive: &str) -> Result<EnvFilter, ArchiveError> {
    EnvFilter::try_new(directive)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| ArchiveError::logging(format!("invalid log level: {e}")))
}

fn make_writer(output: &LogOutput) -> Result<BoxMakeWriter, ArchiveError> {
    match output {
        LogOutput::Stdout => Ok(BoxMakeWriter::new(std::io::stdout)),
        LogOutput::Stderr => Ok(BoxMakeWriter::new(std::io::stderr)),
        LogOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ArchiveError::logging(format!("cannot open {path}: {e}")))?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
    }
}
