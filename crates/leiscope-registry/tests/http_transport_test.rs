use leiscope_core::RegistryConfig;
use leiscope_registry::transport::query;
use leiscope_registry::{HttpTransport, RegistryTransport, TransportOutcome};
use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one canned HTTP response; the handle yields the raw request head.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let request = read_head(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/vnd.api+json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{addr}/api/v1"), handle)
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.expect("read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn transport(base_url: &str, timeout_ms: u64) -> HttpTransport {
    let config = RegistryConfig {
        base_url: base_url.to_string(),
        request_timeout_ms: timeout_ms,
        ..RegistryConfig::default()
    };
    HttpTransport::new(&config).expect("create transport")
}

#[tokio::test]
async fn test_success_body_is_parsed() {
    let (base_url, server) = serve_once("200 OK", r#"{"data":{"id":"529900W18LQJJN6SJ336"}}"#).await;

    let outcome = transport(&base_url, 5_000)
        .fetch("/lei-records/529900W18LQJJN6SJ336", &[])
        .await;

    assert_eq!(
        outcome,
        TransportOutcome::Success(json!({ "data": { "id": "529900W18LQJJN6SJ336" } }))
    );

    let request = server.await.expect("server task");
    assert!(request.starts_with("GET /api/v1/lei-records/529900W18LQJJN6SJ336 HTTP/1.1"));
    assert!(request
        .to_lowercase()
        .contains("accept: application/vnd.api+json"));
    assert!(request.to_lowercase().contains("user-agent: leiscope/"));
}

#[tokio::test]
async fn test_filter_query_is_encoded() {
    let (base_url, server) = serve_once("200 OK", r#"{"data":[]}"#).await;

    let outcome = transport(&base_url, 5_000)
        .fetch("/lei-records", &query([("filter[bic]", "DEUTDEFFXXX")]))
        .await;
    assert_eq!(outcome, TransportOutcome::Success(json!({ "data": [] })));

    let request = server.await.expect("server task");
    assert!(request.starts_with("GET /api/v1/lei-records?filter%5Bbic%5D=DEUTDEFFXXX HTTP/1.1"));
}

#[tokio::test]
async fn test_404_is_not_found() {
    let (base_url, server) = serve_once("404 Not Found", r#"{"errors":[]}"#).await;

    let outcome = transport(&base_url, 5_000)
        .fetch("/lei-records/INVALID1234567890XX", &[])
        .await;

    assert_eq!(outcome, TransportOutcome::NotFound);
    server.await.expect("server task");
}

#[tokio::test]
async fn test_server_error_is_http_error() {
    let (base_url, server) = serve_once("503 Service Unavailable", "").await;

    let outcome = transport(&base_url, 5_000).fetch("/lei-records/X", &[]).await;

    assert_eq!(outcome, TransportOutcome::HttpError(503));
    server.await.expect("server task");
}

#[tokio::test]
async fn test_non_json_success_is_malformed() {
    let (base_url, server) = serve_once("200 OK", "<html>maintenance</html>").await;

    let outcome = transport(&base_url, 5_000).fetch("/lei-records/X", &[]).await;

    match outcome {
        TransportOutcome::Malformed(message) => assert!(message.contains("<html>maintenance")),
        other => panic!("expected malformed outcome, got {other:?}"),
    }
    server.await.expect("server task");
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        read_head(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let outcome = transport(&format!("http://{addr}"), 200)
        .fetch("/lei-records/X", &[])
        .await;

    assert_eq!(outcome, TransportOutcome::Timeout { millis: 200 });
    server.abort();
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let outcome = transport(&format!("http://{addr}"), 5_000)
        .fetch("/lei-records/X", &[])
        .await;

    assert!(matches!(outcome, TransportOutcome::NetworkError(_)));
}
