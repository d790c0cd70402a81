//! Stored transactions and the per-record projection built from them

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Mime marker of index-only entries kept for near-duplicate matching
pub const FUZZY_MIME: &str = "fuzzy";

/// One captured HTTP exchange as read from the transaction store
///
/// Deserializes from the store's JSON dump form, where `ts` is Unix
/// milliseconds and header lists are `[name, value]` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredTransaction {
    /// Absolute URL of the request
    pub url: String,

    /// Capture instant
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ts: DateTime<Utc>,

    /// Classification tag; `FUZZY_MIME` marks index-only entries
    #[serde(default)]
    pub mime: String,

    /// Response status code
    #[serde(default)]
    pub status: Option<u16>,

    /// Response reason phrase as captured
    #[serde(default)]
    pub status_text: Option<String>,

    /// Protocol of the response status line (e.g. `HTTP/1.1`)
    #[serde(default)]
    pub http_version: Option<String>,

    /// Response header fields in capture order
    #[serde(default)]
    pub resp_headers: Vec<(String, String)>,

    /// Request method; `None` means GET
    #[serde(default)]
    pub method: Option<String>,

    /// Request header fields in capture order
    #[serde(default)]
    pub req_headers: Vec<(String, String)>,

    /// Request body (e.g. POST data)
    #[serde(default)]
    pub request_body: Option<Bytes>,

    /// Response body
    #[serde(default)]
    pub payload: Option<Bytes>,
}

impl StoredTransaction {
    /// A bare GET capture with no status, headers or payload
    pub fn new(url: impl Into<String>, ts: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            ts,
            mime: String::new(),
            status: None,
            status_text: None,
            http_version: None,
            resp_headers: Vec::new(),
            method: None,
            req_headers: Vec::new(),
            request_body: None,
            payload: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    pub fn with_status(mut self, status: u16, text: impl Into<String>) -> Self {
        self.status = Some(status);
        self.status_text = Some(text.into());
        self
    }

    pub fn with_response_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.resp_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_request_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.req_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_request_body(mut self, body: impl Into<Bytes>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// Header blocks and timestamp synthesized for one eligible transaction
///
/// Built fresh for every transaction; nothing carries over between records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestResponseInfo {
    /// Target URI shared by the request and response records
    pub url: String,

    /// Capture instant as ISO-8601 UTC with milliseconds
    pub date: String,

    /// Status line and header fields, blank-line terminated
    pub response_headers: String,

    /// Request line and header fields; empty when there is no distinct request
    pub request_headers: String,

    /// Request body; empty when absent
    pub post_data: Bytes,
}

impl RequestResponseInfo {
    /// Whether a request record should accompany the response
    pub fn has_request(&self) -> bool {
        !self.request_headers.is_empty()
    }
}
