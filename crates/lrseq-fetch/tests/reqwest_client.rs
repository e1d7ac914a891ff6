//! `ReqwestClient` against a local server that trickles its body.

#![cfg(feature = "reqwest")]

use std::net::SocketAddr;
use std::time::Duration;

use lrseq_fetch::{ClientSetting, FetchError, Fetcher, ReqwestClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const BODY_LEN: usize = 30;

/// Serves one response of `BODY_LEN` bytes, writing the first `sent` bytes
/// one at a time `every` apart and then going quiet for `stall`.
async fn trickle(sent: usize, every: Duration, stall: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {BODY_LEN}\r\n\r\n");
        socket.write_all(head.as_bytes()).await.unwrap();
        for _ in 0..sent {
            if socket.write_all(b"x").await.is_err() {
                return;
            }
            let _ = socket.flush().await;
            tokio::time::sleep(every).await;
        }
        tokio::time::sleep(stall).await;
    });

    addr
}

fn client(read_timeout: Duration) -> ReqwestClient {
    ReqwestClient::new(ClientSetting {
        proxies: None,
        connect_timeout: Some(Duration::from_secs(2)),
        read_timeout: Some(read_timeout),
    })
    .unwrap()
}

#[tokio::test]
async fn slow_body_outlives_the_read_timeout() {
    // 30 bytes at 50 ms each take about 1.5 s, three times the read limit.
    let addr = trickle(BODY_LEN, Duration::from_millis(50), Duration::ZERO).await;
    let fetcher = Fetcher::new(client(Duration::from_millis(500)));

    let body = fetcher.fetch(&format!("http://{addr}/slow.json")).await.unwrap();

    assert_eq!(body, vec![b'x'; BODY_LEN]);
}

#[tokio::test]
async fn stalled_body_is_a_network_error() {
    let addr = trickle(5, Duration::from_millis(10), Duration::from_secs(3)).await;
    let fetcher = Fetcher::new(client(Duration::from_millis(300)));

    let err = fetcher
        .fetch(&format!("http://{addr}/stalled.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network { .. }), "{err:?}");
}
