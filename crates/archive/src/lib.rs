//! warcpipe - Archive
//!
//! Exports a browsing session's stored HTTP transactions as a WARC archive.
//!
//! # Architecture
//!
//! ```text
//! [TransactionStore] --Stream--> [ArchiveWriter] --> synth --> [RecordCodec] --> [ByteSink]
//!                                                                                    |
//!                                                                                Artifact
//! ```
//!
//! - [`synth`] decides eligibility and rebuilds HTTP header text
//! - [`ArchiveWriter`] drives the session strictly in store order
//! - the codec and sink strategies live in `warcpipe-codec` and `warcpipe-sinks`
//!
//! # Example
//!
//! ```ignore
//! use warcpipe_archive::{ArchiveWriter, MemoryStore, TransactionStore};
//! use warcpipe_config::Config;
//!
//! let config = Config::from_file("warcpipe.toml")?;
//! warcpipe_archive::init_logging(&config.log)?;
//!
//! let mut writer = ArchiveWriter::from_config(&config).await?;
//! let outcome = writer.write_all(store.transactions()).await?;
//! ```

mod error;
mod logging;
mod model;
mod store;
mod writer;

pub mod synth;

pub use error::{ArchiveError, StoreError};
pub use logging::init_logging;
pub use model::{FUZZY_MIME, RequestResponseInfo, StoredTransaction};
pub use store::{MemoryStore, TransactionStore};
pub use synth::{SkipReason, Synthesis, synthesize};
pub use writer::{ArchiveWriter, WriteOutcome, WriterMetrics, WriterSnapshot};

pub use warcpipe_codec::{RecordCodec, WarcCodec};
pub use warcpipe_sinks::{Artifact, ByteSink};
