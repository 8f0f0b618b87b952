//! HTTP transport behaviour: in-flight cap and its clamping

use crate::mock_server::MockServerFixture;
use oms_client::{ApiRequest, ClientConfig, Dispatch, HttpTransport};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Minimal HTTP server that holds each request for `delay` and records the
/// highest number of requests it was serving at once.
async fn slow_server(delay: Duration) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let live = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let peak_out = peak.clone();

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let (live, peak) = (live.clone(), peak.clone());
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                live.fetch_sub(1, Ordering::SeqCst);
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
                    )
                    .await;
            });
        }
    });

    (format!("http://{}/api/", addr), peak_out)
}

async fn fire(transport: &HttpTransport, n: usize) {
    let calls = (0..n).map(|i| transport.invoke(ApiRequest::get(format!("orders/{}", i))));
    for result in futures::future::join_all(calls).await {
        assert_eq!(result.unwrap().data, json!({}));
    }
}

#[tokio::test]
async fn test_inflight_cap_bounds_concurrent_requests() {
    let (base_url, peak) = slow_server(Duration::from_millis(50)).await;
    let transport = HttpTransport::new(&ClientConfig::new(base_url).with_max_inflight(2)).unwrap();

    fire(&transport, 6).await;

    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= 2, "peak concurrency {} exceeded the cap", peak);
    assert!(peak >= 1);
    assert_eq!(transport.available_permits(), Some(2));
}

#[tokio::test]
async fn test_uncapped_transport_runs_requests_together() {
    let (base_url, peak) = slow_server(Duration::from_millis(100)).await;
    let transport = HttpTransport::new(&ClientConfig::new(base_url)).unwrap();

    fire(&transport, 4).await;

    assert!(peak.load(Ordering::SeqCst) > 2);
}

#[tokio::test]
async fn test_zero_inflight_cap_still_completes() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_post_json("solr-query", 200, &json!({"grouped": {}}))
        .await;

    let mut config = fixture.config();
    config.max_inflight = Some(0);
    let service = fixture.service_with(config);

    let resp = tokio::time::timeout(
        Duration::from_secs(2),
        service.get_open_orders(json!({"json": {"query": "*:*"}})),
    )
    .await
    .expect("request completes under a zero cap")
    .unwrap();
    assert_eq!(resp.data, json!({"grouped": {}}));
}
