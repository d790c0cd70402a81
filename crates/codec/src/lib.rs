//! warcpipe - Codec
//!
//! Turns synthesized HTTP header blocks and payloads into framed WARC
//! records. The archive writer only talks to the [`RecordCodec`] trait; the
//! bundled [`WarcCodec`] produces WARC/1.0 records, one gzip member per
//! record when compression is enabled.
//!
//! ```text
//! [RequestResponseInfo] --headers+payload--> [RecordCodec] --Bytes--> [ByteSink]
//! ```

mod error;
mod warc;

pub use error::CodecError;
pub use warc::{CodecOptions, RecordType, WARC_VERSION, WarcCodec};

use bytes::Bytes;

/// Header text and body of one HTTP message inside a record pair
#[derive(Debug, Clone, Copy)]
pub struct HttpPart<'a> {
    /// Start line plus header fields, blank-line terminated
    pub headers: &'a str,
    /// Message body (may be empty)
    pub body: &'a [u8],
}

impl<'a> HttpPart<'a> {
    pub fn new(headers: &'a str, body: &'a [u8]) -> Self {
        Self { headers, body }
    }
}

/// Framing codec boundary
///
/// Each call returns the complete framed bytes for the record(s) it emits.
/// Implementations never buffer across calls, so the caller can forward the
/// returned bytes straight to a sink.
pub trait RecordCodec: Send {
    /// Frame a single `response` record
    fn emit_response_record(
        &self,
        url: &str,
        date: &str,
        headers: &str,
        payload: &[u8],
    ) -> Result<Bytes, CodecError>;

    /// Frame a `request` record followed by its `response` record
    ///
    /// Both records share `url` and `date`.
    fn emit_request_response_records(
        &self,
        url: &str,
        date: &str,
        request: HttpPart<'_>,
        response: HttpPart<'_>,
    ) -> Result<Bytes, CodecError>;

    /// Frame the leading `warcinfo` record, if this codec writes one
    fn emit_warcinfo(&self, _date: &str) -> Result<Option<Bytes>, CodecError> {
        Ok(None)
    }
}
