//! End-to-end archive sessions through the real WARC codec

use std::io::Read;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use flate2::read::MultiGzDecoder;
use warcpipe_archive::{
    ArchiveError, ArchiveWriter, Artifact, ByteSink, FUZZY_MIME, MemoryStore, StoreError,
    StoredTransaction, TransactionStore, WarcCodec,
};
use warcpipe_codec::{CodecError, CodecOptions, HttpPart, RecordCodec};
use warcpipe_config::Config;
use warcpipe_sinks::MemorySink;

// ============================================================================
// Helpers
// ============================================================================

/// One parsed uncompressed WARC record
struct Record {
    fields: Vec<(String, String)>,
    block: Vec<u8>,
}

impl Record {
    fn field(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or_else(|| panic!("missing {name}"))
    }
}

fn parse_records(data: &[u8]) -> Vec<Record> {
    let mut records = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let head_len = data[pos..]
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("record header terminator");
        let head = std::str::from_utf8(&data[pos..pos + head_len]).unwrap();
        let mut lines = head.split("\r\n");
        assert_eq!(lines.next(), Some("WARC/1.0"));

        let fields: Vec<(String, String)> = lines
            .map(|line| {
                let (name, value) = line.split_once(": ").unwrap();
                (name.to_string(), value.to_string())
            })
            .collect();
        let length: usize = fields
            .iter()
            .find(|(n, _)| n == "Content-Length")
            .unwrap()
            .1
            .parse()
            .unwrap();

        let block_start = pos + head_len + 4;
        let block = data[block_start..block_start + length].to_vec();
        assert_eq!(&data[block_start + length..block_start + length + 4], b"\r\n\r\n");

        records.push(Record { fields, block });
        pos = block_start + length + 4;
    }

    records
}

fn plain_codec() -> WarcCodec {
    WarcCodec::new(CodecOptions {
        gzip: false,
        ..Default::default()
    })
}

fn capture(url: &str) -> StoredTransaction {
    StoredTransaction::new(url, Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap())
}

async fn archive_in_memory(store: &MemoryStore) -> Vec<Record> {
    let mut writer = ArchiveWriter::new(plain_codec(), MemorySink::new());
    let outcome = writer.write_all(store.transactions()).await.unwrap();
    parse_records(outcome.artifact.bytes().unwrap())
}

/// Passes calls through to a real codec, keeping a copy of every output
struct TappedCodec {
    inner: WarcCodec,
    outputs: Arc<Mutex<Vec<Bytes>>>,
}

impl TappedCodec {
    fn keep(&self, result: Result<Bytes, CodecError>) -> Result<Bytes, CodecError> {
        if let Ok(bytes) = &result {
            self.outputs.lock().unwrap().push(bytes.clone());
        }
        result
    }
}

impl RecordCodec for TappedCodec {
    fn emit_response_record(
        &self,
        url: &str,
        date: &str,
        headers: &str,
        payload: &[u8],
    ) -> Result<Bytes, CodecError> {
        self.keep(self.inner.emit_response_record(url, date, headers, payload))
    }

    fn emit_request_response_records(
        &self,
        url: &str,
        date: &str,
        request: HttpPart<'_>,
        response: HttpPart<'_>,
    ) -> Result<Bytes, CodecError> {
        self.keep(
            self.inner
                .emit_request_response_records(url, date, request, response),
        )
    }
}

// ============================================================================
// Eligibility and record shape
// ============================================================================

#[tokio::test]
async fn test_only_eligible_transaction_archived() {
    let store = MemoryStore::new(vec![
        capture("http://example.com/").with_mime(FUZZY_MIME),
        capture("ftp://x"),
        capture("http://example.com").with_payload(Bytes::from_static(b"hello")),
    ]);

    let records = archive_in_memory(&store).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.field("WARC-Type"), "response");
    assert_eq!(record.field("WARC-Target-URI"), "http://example.com");
    assert_eq!(record.field("WARC-Date"), "2024-05-06T07:08:09.000Z");
    assert!(record.block.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert!(record.block.ends_with(b"\r\n\r\nhello"));
}

#[tokio::test]
async fn test_non_get_request_yields_pair() {
    let store = MemoryStore::new(vec![
        capture("https://example.com/submit")
            .with_method("POST")
            .with_request_header("Content-Type", "text/plain")
            .with_request_body(Bytes::from_static(b"ping"))
            .with_status(201, "Created")
            .with_payload(Bytes::from_static(b"pong")),
    ]);

    let records = archive_in_memory(&store).await;

    assert_eq!(records.len(), 2);
    let (request, response) = (&records[0], &records[1]);
    assert_eq!(request.field("WARC-Type"), "request");
    assert_eq!(response.field("WARC-Type"), "response");
    assert_eq!(request.field("WARC-Target-URI"), response.field("WARC-Target-URI"));
    assert_eq!(request.field("WARC-Date"), response.field("WARC-Date"));
    assert_eq!(
        request.field("WARC-Concurrent-To"),
        response.field("WARC-Record-ID")
    );
    assert_eq!(
        request.block,
        b"POST /submit HTTP/1.1\r\nContent-Type: text/plain\r\n\r\nping"
    );
    assert!(response.block.starts_with(b"HTTP/1.1 201 Created\r\n"));
    assert!(response.block.ends_with(b"pong"));
}

#[tokio::test]
async fn test_record_counts_per_transaction() {
    let store = MemoryStore::new(vec![
        capture("http://a.example/"),
        capture("http://b.example/").with_method("DELETE"),
        capture("urn:skip"),
        capture("http://c.example/").with_request_header("Accept", "*/*"),
    ]);

    let kinds: Vec<String> = archive_in_memory(&store)
        .await
        .iter()
        .map(|r| format!("{} {}", r.field("WARC-Type"), r.field("WARC-Target-URI")))
        .collect();

    assert_eq!(
        kinds,
        vec![
            "response http://a.example/",
            "request http://b.example/",
            "response http://b.example/",
            "request http://c.example/",
            "response http://c.example/",
        ]
    );
}

#[tokio::test]
async fn test_absent_payload_is_empty_body() {
    let store = MemoryStore::new(vec![capture("http://example.com/empty").with_status(204, "No Content")]);

    let records = archive_in_memory(&store).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].block, b"HTTP/1.1 204 No Content\r\n\r\n");
    assert_eq!(records[0].field("Content-Length"), "27");
    assert_eq!(
        records[0].field("WARC-Payload-Digest"),
        "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

// ============================================================================
// Byte order
// ============================================================================

#[tokio::test]
async fn test_artifact_is_codec_outputs_in_order() {
    let outputs = Arc::new(Mutex::new(Vec::new()));
    let codec = TappedCodec {
        inner: plain_codec(),
        outputs: Arc::clone(&outputs),
    };

    let store = MemoryStore::new(
        (0..20)
            .map(|i| {
                let tx = capture(&format!("http://example.com/{i}"))
                    .with_payload(Bytes::from(format!("body {i}")));
                if i % 3 == 0 { tx.with_method("POST") } else { tx }
            })
            .collect(),
    );

    let mut writer = ArchiveWriter::new(codec, MemorySink::new());
    let outcome = writer.write_all(store.transactions()).await.unwrap();

    let expected: Vec<u8> = outputs
        .lock()
        .unwrap()
        .iter()
        .flat_map(|b| b.iter().copied())
        .collect();
    assert_eq!(outputs.lock().unwrap().len(), 20);
    assert_eq!(outcome.artifact.bytes().unwrap().as_ref(), expected.as_slice());
}

// ============================================================================
// File sink
// ============================================================================

fn file_config(path: &std::path::Path) -> Config {
    Config::from_str(&format!(
        r#"
[codec]
gzip = true
software = "warcpipe-test/0.1"

[sink]
type = "file"
path = "{}"
"#,
        path.display()
    ))
    .unwrap()
}

#[tokio::test]
async fn test_file_archive_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.warc.gz");
    let config = file_config(&path);

    let store = MemoryStore::from_json(
        r#"[
            {"url": "http://example.com/", "ts": 1700000000000, "status": 200,
             "resp_headers": [["Content-Type", "text/plain"]], "payload": [104, 105]},
            {"url": "http://example.com/", "ts": 1700000000001, "mime": "fuzzy"},
            {"url": "https://example.com/login", "ts": 1700000000002, "method": "POST",
             "request_body": [117, 61, 49]}
        ]"#,
    )
    .unwrap();

    let mut writer = ArchiveWriter::from_config(&config).await.unwrap();
    let outcome = writer.write_all(store.transactions()).await.unwrap();

    let written = std::fs::read(&path).unwrap();
    match &outcome.artifact {
        Artifact::VirtualFile {
            length, warnings, ..
        } => {
            assert_eq!(*length, written.len() as u64);
            assert!(warnings.is_empty());
        }
        other => panic!("expected virtual file, got {other:?}"),
    }

    let mut plain = Vec::new();
    MultiGzDecoder::new(written.as_slice())
        .read_to_end(&mut plain)
        .unwrap();
    let records = parse_records(&plain);

    let kinds: Vec<&str> = records.iter().map(|r| r.field("WARC-Type")).collect();
    assert_eq!(kinds, vec!["warcinfo", "response", "request", "response"]);
    assert!(records[1].block.ends_with(b"hi"));
    assert!(records[2].block.ends_with(b"u=1"));
    assert_eq!(outcome.writer.skipped_fuzzy, 1);
    assert_eq!(outcome.sink.write_errors, 0);
}

#[tokio::test]
async fn test_file_archive_rejects_writes_after_finish() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.warc.gz");

    let mut writer = ArchiveWriter::from_config(&file_config(&path)).await.unwrap();
    writer
        .write_transaction(&capture("http://example.com/"))
        .unwrap();
    let outcome = writer.finish().await.unwrap();
    let size = std::fs::metadata(&path).unwrap().len();
    assert_eq!(outcome.artifact.len(), size);

    writer
        .write_transaction(&capture("http://example.com/late"))
        .unwrap();
    assert_eq!(writer.sink().metrics().rejected_writes, 1);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), size);
}

#[tokio::test]
async fn test_store_failure_aborts_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.warc.gz");

    let store = MemoryStore::new(vec![capture("http://a/"), capture("http://b/")]).failing_at(1);
    let mut writer = ArchiveWriter::from_config(&file_config(&path)).await.unwrap();

    let err = writer.write_all(store.transactions()).await.unwrap_err();
    assert!(matches!(err, ArchiveError::Store(StoreError::Read { index: 1, .. })));
    assert_eq!(writer.metrics().snapshot().response_records, 1);
}
