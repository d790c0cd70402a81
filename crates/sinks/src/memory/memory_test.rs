//! Tests for the memory sink

use bytes::Bytes;
use warcpipe_config::MemorySinkConfig;

use super::MemorySink;
use crate::{Artifact, ByteSink, OCTET_STREAM, SinkError};

#[test]
fn test_new_sink_is_empty() {
    let sink = MemorySink::new();
    assert!(sink.is_empty());
    assert!(sink.chunks().is_empty());
    assert!(!sink.is_finished());
}

#[test]
fn test_write_accumulates_in_order() {
    let mut sink = MemorySink::new();

    assert!(sink.write(Bytes::from_static(b"one")));
    assert!(sink.write(Bytes::from_static(b"two!")));
    assert!(sink.write(Bytes::from_static(b"")));

    assert_eq!(sink.len(), 7);
    let chunks: Vec<&[u8]> = sink.chunks().iter().map(|c| c.as_ref()).collect();
    assert_eq!(chunks, vec![&b"one"[..], &b"two!"[..], &b""[..]]);
}

#[test]
fn test_drained_after_each_write() {
    let mut sink = MemorySink::new();
    let drained = sink.drained();

    sink.write(Bytes::from_static(b"abc"));
    assert_eq!(*drained.borrow(), 3);

    sink.write(Bytes::from_static(b"de"));
    assert_eq!(*drained.borrow(), 5);
}

#[test]
fn test_metrics_track_writes() {
    let mut sink = MemorySink::new();
    sink.write(Bytes::from_static(b"abc"));
    sink.write(Bytes::from_static(b"de"));

    let snapshot = sink.metrics();
    assert_eq!(snapshot.chunks_received, 2);
    assert_eq!(snapshot.bytes_received, 5);
    assert_eq!(snapshot.bytes_written, 5);
    assert_eq!(snapshot.write_errors, 0);
}

#[tokio::test]
async fn test_finish_concatenates() {
    let mut sink = MemorySink::new();
    sink.write(Bytes::from_static(b"WARC/1.0\r\n"));
    sink.write(Bytes::from_static(b"payload"));

    let artifact = sink.finish().await.unwrap();
    match artifact {
        Artifact::Blob {
            bytes,
            content_type,
        } => {
            assert_eq!(bytes.as_ref(), b"WARC/1.0\r\npayload");
            assert_eq!(content_type, OCTET_STREAM);
        }
        other => panic!("unexpected artifact {other:?}"),
    }
}

#[tokio::test]
async fn test_finish_single_chunk() {
    let mut sink = MemorySink::new();
    let chunk = Bytes::from_static(b"only");
    sink.write(chunk.clone());

    let artifact = sink.finish().await.unwrap();
    assert_eq!(artifact.bytes(), Some(&chunk));
}

#[tokio::test]
async fn test_finish_empty() {
    let mut sink = MemorySink::new();
    let artifact = sink.finish().await.unwrap();
    assert!(artifact.is_empty());
}

#[tokio::test]
async fn test_write_after_finish_rejected() {
    let mut sink = MemorySink::new();
    sink.write(Bytes::from_static(b"abc"));
    sink.finish().await.unwrap();

    assert!(sink.is_finished());
    assert!(!sink.write(Bytes::from_static(b"late")));
    assert_eq!(sink.len(), 3);
    assert_eq!(sink.metrics().rejected_writes, 1);
}

#[tokio::test]
async fn test_finish_twice_errors() {
    let mut sink = MemorySink::new();
    sink.finish().await.unwrap();

    let err = sink.finish().await.unwrap_err();
    assert!(matches!(err, SinkError::AlreadyFinished));
}

#[test]
fn test_from_config() {
    let sink = MemorySink::from_config(&MemorySinkConfig { initial_chunks: 64 });
    assert!(sink.chunks.capacity() >= 64);
}
