//! WARC/1.0 record framing
//!
//! # Record layout
//!
//! ```text
//! WARC/1.0\r\n
//! WARC-Type: response\r\n
//! WARC-Record-ID: <urn:uuid:...>\r\n
//! WARC-Date: 2024-01-02T03:04:05.678Z\r\n
//! WARC-Target-URI: http://example.com/\r\n
//! Content-Type: application/http; msgtype=response\r\n
//! WARC-Payload-Digest: sha256:<hex>\r\n
//! WARC-Block-Digest: sha256:<hex>\r\n
//! Content-Length: <block length>\r\n
//! \r\n
//! <HTTP header text><payload>\r\n
//! \r\n
//! ```
//!
//! With gzip enabled every record is compressed as an independent gzip
//! member, so readers can seek to any record offset.

use std::fmt::Write as _;
use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use warcpipe_config::CodecConfig;

use crate::error::CodecError;
use crate::{HttpPart, RecordCodec};

/// Version line written at the top of every record
pub const WARC_VERSION: &str = "WARC/1.0";

const CRLF: &[u8] = b"\r\n";

/// WARC record types emitted by this codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Warcinfo,
    Request,
    Response,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warcinfo => "warcinfo",
            Self::Request => "request",
            Self::Response => "response",
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            Self::Warcinfo => "application/warc-fields",
            Self::Request => "application/http; msgtype=request",
            Self::Response => "application/http; msgtype=response",
        }
    }
}

/// Framing options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    /// One gzip member per record
    pub gzip: bool,

    /// Output continues an existing archive; suppresses warcinfo
    pub appending: bool,

    /// Software name advertised in the warcinfo record
    pub software: Option<String>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            gzip: true,
            appending: false,
            software: None,
        }
    }
}

impl From<&CodecConfig> for CodecOptions {
    fn from(config: &CodecConfig) -> Self {
        Self {
            gzip: config.gzip,
            appending: config.appending,
            software: config.software.clone(),
        }
    }
}

/// WARC/1.0 record codec
#[derive(Debug, Clone, Default)]
pub struct WarcCodec {
    options: CodecOptions,
}

/// Headers of one record before serialization
struct RecordHead<'a> {
    kind: RecordType,
    record_id: &'a str,
    date: &'a str,
    target_uri: Option<&'a str>,
    concurrent_to: Option<&'a str>,
}

impl WarcCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(CodecOptions::from(config))
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    fn new_record_id() -> String {
        format!("<urn:uuid:{}>", Uuid::new_v4())
    }

    /// Serialize one record (headers + block) and apply gzip if enabled
    ///
    /// `block` is the HTTP header text followed by the payload; the payload
    /// digest covers only `payload`.
    fn frame(
        &self,
        head: RecordHead<'_>,
        block_head: &[u8],
        payload: &[u8],
    ) -> Result<Bytes, CodecError> {
        if let Some(uri) = head.target_uri
            && uri.bytes().any(|b| b == b'\r' || b == b'\n')
        {
            return Err(CodecError::invalid_uri(uri, "contains a line break"));
        }

        let mut block_hasher = Sha256::new();
        block_hasher.update(block_head);
        block_hasher.update(payload);
        let block_digest = hex::encode(block_hasher.finalize());
        let content_length = block_head.len() + payload.len();

        let mut header = String::with_capacity(512);
        // fmt::Write on String is infallible
        let _ = write!(header, "{WARC_VERSION}\r\n");
        let _ = write!(header, "WARC-Type: {}\r\n", head.kind.as_str());
        let _ = write!(header, "WARC-Record-ID: {}\r\n", head.record_id);
        let _ = write!(header, "WARC-Date: {}\r\n", head.date);
        if let Some(uri) = head.target_uri {
            let _ = write!(header, "WARC-Target-URI: {uri}\r\n");
        }
        if let Some(other) = head.concurrent_to {
            let _ = write!(header, "WARC-Concurrent-To: {other}\r\n");
        }
        let _ = write!(header, "Content-Type: {}\r\n", head.kind.content_type());
        if head.kind != RecordType::Warcinfo {
            let payload_digest = hex::encode(Sha256::digest(payload));
            let _ = write!(header, "WARC-Payload-Digest: sha256:{payload_digest}\r\n");
        }
        let _ = write!(header, "WARC-Block-Digest: sha256:{block_digest}\r\n");
        let _ = write!(header, "Content-Length: {content_length}\r\n\r\n");

        let mut record = BytesMut::with_capacity(header.len() + content_length + 4);
        record.put_slice(header.as_bytes());
        record.put_slice(block_head);
        record.put_slice(payload);
        record.put_slice(CRLF);
        record.put_slice(CRLF);

        if !self.options.gzip {
            return Ok(record.freeze());
        }

        let mut encoder = GzEncoder::new(
            Vec::with_capacity(record.len() / 2 + 64),
            Compression::default(),
        );
        encoder.write_all(&record)?;
        Ok(Bytes::from(encoder.finish()?))
    }
}

impl RecordCodec for WarcCodec {
    fn emit_response_record(
        &self,
        url: &str,
        date: &str,
        headers: &str,
        payload: &[u8],
    ) -> Result<Bytes, CodecError> {
        let record_id = Self::new_record_id();
        self.frame(
            RecordHead {
                kind: RecordType::Response,
                record_id: &record_id,
                date,
                target_uri: Some(url),
                concurrent_to: None,
            },
            headers.as_bytes(),
            payload,
        )
    }

    fn emit_request_response_records(
        &self,
        url: &str,
        date: &str,
        request: HttpPart<'_>,
        response: HttpPart<'_>,
    ) -> Result<Bytes, CodecError> {
        let response_id = Self::new_record_id();
        let request_id = Self::new_record_id();

        let request_bytes = self.frame(
            RecordHead {
                kind: RecordType::Request,
                record_id: &request_id,
                date,
                target_uri: Some(url),
                concurrent_to: Some(&response_id),
            },
            request.headers.as_bytes(),
            request.body,
        )?;
        let response_bytes = self.frame(
            RecordHead {
                kind: RecordType::Response,
                record_id: &response_id,
                date,
                target_uri: Some(url),
                concurrent_to: None,
            },
            response.headers.as_bytes(),
            response.body,
        )?;

        let mut out = BytesMut::with_capacity(request_bytes.len() + response_bytes.len());
        out.put_slice(&request_bytes);
        out.put_slice(&response_bytes);
        Ok(out.freeze())
    }

    fn emit_warcinfo(&self, date: &str) -> Result<Option<Bytes>, CodecError> {
        if self.options.appending {
            return Ok(None);
        }
        let Some(software) = self.options.software.as_deref() else {
            return Ok(None);
        };

        let fields = format!("software: {software}\r\nformat: WARC File Format 1.0\r\n");
        let record_id = Self::new_record_id();
        self.frame(
            RecordHead {
                kind: RecordType::Warcinfo,
                record_id: &record_id,
                date,
                target_uri: None,
                concurrent_to: None,
            },
            fields.as_bytes(),
            &[],
        )
        .map(Some)
    }
}

#[cfg(test)]
#[path = "warc_test.rs"]
mod warc_test;
