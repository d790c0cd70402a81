//! Record synthesis
//!
//! Decides whether a stored transaction becomes WARC records and, if so,
//! rebuilds the HTTP header text the codec wraps. Pure: no I/O, never fails.
//! Missing or malformed capture metadata degrades to defaults (status 200,
//! `HTTP/1.1`, canonical reason phrase, request path `/`).

use std::fmt::{self, Write as _};

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use http::{StatusCode, Uri};

use crate::model::{FUZZY_MIME, RequestResponseInfo, StoredTransaction};

const DEFAULT_STATUS: u16 = 200;
const DEFAULT_HTTP_VERSION: &str = "HTTP/1.1";

/// Why a transaction produced no records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Index-only fuzzy-match entry
    FuzzyMatch,
    /// URL is not http: or https:
    UnsupportedScheme,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FuzzyMatch => "fuzzy_match",
            Self::UnsupportedScheme => "unsupported_scheme",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of synthesizing one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    /// Write these records
    Record {
        info: RequestResponseInfo,
        /// Response body, empty when the capture had none
        payload: Bytes,
    },
    /// Write nothing
    Skip(SkipReason),
}

/// Apply the eligibility policy
pub fn eligibility(tx: &StoredTransaction) -> Result<(), SkipReason> {
    if tx.mime == FUZZY_MIME {
        return Err(SkipReason::FuzzyMatch);
    }
    if !tx.url.starts_with("http:") && !tx.url.starts_with("https:") {
        return Err(SkipReason::UnsupportedScheme);
    }
    Ok(())
}

/// Build the records for `tx`, or the reason it is skipped
pub fn synthesize(tx: &StoredTransaction) -> Synthesis {
    if let Err(reason) = eligibility(tx) {
        return Synthesis::Skip(reason);
    }

    let info = RequestResponseInfo {
        url: tx.url.clone(),
        date: format_timestamp(&tx.ts),
        response_headers: response_headers_text(tx),
        request_headers: request_headers_text(tx),
        post_data: tx.request_body.clone().unwrap_or_default(),
    };

    Synthesis::Record {
        info,
        payload: tx.payload.clone().unwrap_or_default(),
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-02T03:04:05.678Z`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Status line plus response header fields
pub fn response_headers_text(tx: &StoredTransaction) -> String {
    let version = tx
        .http_version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_HTTP_VERSION);
    let status = tx.status.unwrap_or(DEFAULT_STATUS);
    let reason = match tx.status_text.as_deref() {
        Some(text) => text.to_string(),
        None => canonical_reason(status).to_string(),
    };

    let mut out = String::with_capacity(64 + tx.resp_headers.len() * 32);
    let _ = write!(out, "{} {} {}\r\n", version, status, single_line(&reason));
    push_header_fields(&mut out, &tx.resp_headers);
    out
}

/// Request line plus request header fields, or empty when the capture has
/// no distinct request (a GET without recorded headers)
pub fn request_headers_text(tx: &StoredTransaction) -> String {
    let method = tx
        .method
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("GET");

    if method.eq_ignore_ascii_case("GET") && tx.req_headers.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(64 + tx.req_headers.len() * 32);
    let _ = write!(
        out,
        "{} {} {}\r\n",
        method.to_ascii_uppercase(),
        request_target(&tx.url),
        DEFAULT_HTTP_VERSION
    );
    push_header_fields(&mut out, &tx.req_headers);
    out
}

fn canonical_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

/// Path and query of `url`, `/` when it has none or cannot be parsed
fn request_target(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    without_fragment
        .parse::<Uri>()
        .ok()
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .filter(|target| target.starts_with('/'))
        .unwrap_or_else(|| "/".to_string())
}

/// Append `Name: value\r\n` per field, then the blank line
fn push_header_fields(out: &mut String, fields: &[(String, String)]) {
    for (name, value) in fields {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let _ = write!(out, "{}: {}\r\n", single_line(name), single_line(value));
    }
    out.push_str("\r\n");
}

/// Stored values may contain folded lines; a raw CR or LF would end the
/// header block early
fn single_line(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains(['\r', '\n']) {
        std::borrow::Cow::Owned(s.replace(['\r', '\n'], " "))
    } else {
        std::borrow::Cow::Borrowed(s)
    }
}

#[cfg(test)]
#[path = "synth_test.rs"]
mod synth_test;
