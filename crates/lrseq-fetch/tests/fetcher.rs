//! Integration tests for the fetcher against in-memory and filesystem
//! transports.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use lrseq_fetch::{
    BoxStream, FetchError, FetchOptions, FetchPhase, Fetcher, FsClient, HttpClient, HttpResponse,
    Progress,
};

/// Mock transport serving one body in fixed-size chunks.
#[derive(Debug)]
struct TestHttpClient {
    data: Vec<u8>,
    status: u16,
    declare_length: bool,
    chunk_size: usize,
    fail_connect: bool,
}

impl TestHttpClient {
    fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            status: 200,
            declare_length: true,
            chunk_size: 4,
            fail_connect: false,
        }
    }
}

#[derive(Debug)]
struct TestError(String);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TestError {}

impl HttpClient for TestHttpClient {
    type Error = TestError;

    async fn stream(
        &self,
        _url: &str,
        _headers: &[(String, String)],
    ) -> Result<HttpResponse<Self::Error>, Self::Error> {
        if self.fail_connect {
            return Err(TestError("connection refused".into()));
        }
        let chunks: Vec<_> = self
            .data
            .chunks(self.chunk_size)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        let body: BoxStream<'static, Result<Bytes, TestError>> =
            Box::pin(futures_util::stream::iter(chunks));
        Ok(HttpResponse {
            status: self.status,
            content_length: self.declare_length.then_some(self.data.len() as u64),
            body,
        })
    }
}

fn recording_options() -> (FetchOptions, Arc<Mutex<Vec<Progress>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let options = FetchOptions::default().on_progress(Arc::new(move |p: &Progress| {
        sink.lock().unwrap().push(*p);
    }));
    (options, events)
}

#[tokio::test]
async fn streams_with_declared_length() {
    let data = b"0123456789".to_vec();
    let (options, events) = recording_options();
    let fetcher = Fetcher::new(TestHttpClient::new(data.clone())).with_options(options);

    let body = fetcher.fetch("data.json").await.unwrap();
    assert_eq!(body, data);

    let events = events.lock().unwrap();
    assert_eq!(events.first().unwrap().phase, FetchPhase::Connecting);
    assert_eq!(events.last().unwrap().phase, FetchPhase::Completed);

    let downloading: Vec<u64> = events
        .iter()
        .filter(|p| p.phase == FetchPhase::Downloading)
        .map(|p| p.bytes_received)
        .collect();
    assert_eq!(downloading, vec![0, 4, 8, 10]);
    assert!(events.iter().skip(1).all(|p| p.total_bytes == Some(10)));
}

#[tokio::test]
async fn buffers_whole_body_without_length() {
    let data = b"0123456789".to_vec();
    let mut client = TestHttpClient::new(data.clone());
    client.declare_length = false;
    let (options, events) = recording_options();
    let fetcher = Fetcher::new(client).with_options(options);

    let body = fetcher.fetch("data.json").await.unwrap();
    assert_eq!(body, data);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].phase, FetchPhase::Connecting);
    assert_eq!(events[1], Progress::new(FetchPhase::Completed, 10, None));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mut client = TestHttpClient::new(Vec::new());
    client.status = 404;
    let fetcher = Fetcher::new(client);

    let err = fetcher.fetch("missing.json").await.unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
    assert_eq!(err.to_string(), "HTTP 404 fetching missing.json");
}

#[tokio::test]
async fn transport_failure_is_a_network_error() {
    let mut client = TestHttpClient::new(Vec::new());
    client.fail_connect = true;
    let fetcher = Fetcher::new(client);

    let err = fetcher.fetch("data.json").await.unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn empty_url_is_rejected() {
    let fetcher = Fetcher::new(TestHttpClient::new(Vec::new()));
    assert!(matches!(
        fetcher.fetch("").await,
        Err(FetchError::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn fs_client_serves_files_and_404s() {
    let dir = tempfile::Builder::new()
        .prefix("lrseq-fetch-")
        .tempdir()
        .expect("Failed to create temp dir");
    std::fs::write(dir.path().join("data.json"), b"[]").unwrap();

    let fetcher = Fetcher::new(FsClient::new(dir.path()));
    assert_eq!(fetcher.fetch("data.json").await.unwrap(), b"[]");

    let err = fetcher.fetch("nope.json").await.unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn shared_client_through_arc() {
    let client = Arc::new(TestHttpClient::new(b"abc".to_vec()));
    let fetcher = Fetcher::new(Arc::clone(&client));
    assert_eq!(fetcher.fetch("x").await.unwrap(), b"abc");
}
