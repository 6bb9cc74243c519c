//! Request lines as a server actually receives them.
//!
//! wiremock parses request targets through `url::Url`, which collapses dot
//! segments, so these tests run against a bare TCP server that records the
//! raw request line.

mod common;

use common::{collect, test_config};
use leaklens::http::HttpClient;
use leaklens::models::{FindingKind, Target};
use leaklens::scanner::debug_log::DebugLogProber;
use leaklens::scanner::{PathProber, Shutdown};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Serves `body` with 200 on exactly one request target, 404 everywhere else
struct RecordingServer {
    base: String,
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingServer {
    async fn start(target: &'static str, body: String, declare_length: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let lines = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&lines);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let body = body.clone();
                tokio::spawn(async move {
                    let _ = respond(stream, target, &body, declare_length, recorded).await;
                });
            }
        });

        Self { base, lines }
    }

    fn request_lines(&self) -> Vec<String> {
        self.lines.lock().expect("lock").clone()
    }
}

async fn respond(
    mut stream: TcpStream,
    target: &str,
    body: &str,
    declare_length: bool,
    recorded: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        head.extend_from_slice(&buf[..n]);
    }

    let text = String::from_utf8_lossy(&head);
    let request_line = text.lines().next().unwrap_or_default().to_string();
    recorded.lock().expect("lock").push(request_line.clone());

    let mut parts = request_line.split(' ');
    let method = parts.next().unwrap_or_default();
    let path = parts.next().unwrap_or_default();

    let response = if path == target {
        let mut out = String::from("HTTP/1.1 200 OK\r\nConnection: close\r\n");
        if declare_length {
            out.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        out.push_str("\r\n");
        if method != "HEAD" {
            out.push_str(body);
        }
        out
    } else {
        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
    };

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn client() -> HttpClient {
    HttpClient::from_config(&test_config()).expect("client")
}

fn padded(first_line: &str, total: usize) -> String {
    let mut body = format!("{first_line}\n");
    while body.len() < total {
        body.push('.');
    }
    body
}

#[tokio::test]
async fn test_traversal_paths_sent_unnormalized() {
    let server = RecordingServer::start(
        "/debug.log",
        padded("PHP Fatal error: Uncaught Error in /var/www/html/wp-load.php", 300),
        true,
    )
    .await;

    let target = Target::parse(&server.base).expect("target");
    let (tx, rx) = mpsc::channel(32);
    let report = DebugLogProber
        .scan_target(&client(), &target, &tx, &mut Shutdown::never())
        .await;
    drop(tx);
    let findings = collect(rx).await;

    let lines = server.request_lines();
    assert!(lines.contains(&"HEAD /../debug.log HTTP/1.1".to_string()), "lines: {lines:?}");
    assert!(
        lines.contains(&"HEAD /wp-content/../debug.log HTTP/1.1".to_string()),
        "lines: {lines:?}"
    );
    assert_eq!(
        lines.iter().filter(|l| *l == "HEAD /debug.log HTTP/1.1").count(),
        1,
        "dot segments were collapsed: {lines:?}"
    );
    assert_eq!(
        lines.iter().filter(|l| *l == "GET /debug.log HTTP/1.1").count(),
        1
    );
    assert_eq!(lines.len(), 11);

    assert_eq!(report.attempted, 10);
    assert_eq!(findings.len(), 1, "findings: {findings:?}");
    assert_eq!(findings[0].kind, FindingKind::ConfirmedLog);
    assert_eq!(findings[0].url, format!("{}/debug.log", server.base));
}

#[tokio::test]
async fn test_traversal_hit_reported_with_traversal_url() {
    let server = RecordingServer::start(
        "/wp-content/../debug.log",
        padded("[18-Oct-2026 10:00:00 UTC] PHP Notice: Undefined index: page", 300),
        true,
    )
    .await;

    let url = format!("{}/wp-content/../debug.log", server.base);
    let finding = DebugLogProber.probe(&client(), &url).await.expect("finding");

    assert_eq!(finding.kind, FindingKind::ConfirmedLog);
    assert_eq!(finding.url, url);
    assert_eq!(finding.size, Some(300));
    assert_eq!(
        server.request_lines(),
        vec![
            "HEAD /wp-content/../debug.log HTTP/1.1",
            "GET /wp-content/../debug.log HTTP/1.1",
        ]
    );
}

#[tokio::test]
async fn test_log_without_length_or_signal_is_dropped() {
    let server = RecordingServer::start("/wp-content/debug.log", padded("nothing here", 400), false).await;

    let url = format!("{}/wp-content/debug.log", server.base);
    assert!(DebugLogProber.probe(&client(), &url).await.is_none());
    assert!(server
        .request_lines()
        .contains(&"GET /wp-content/debug.log HTTP/1.1".to_string()));
}

#[tokio::test]
async fn test_log_without_length_but_with_signal_is_confirmed() {
    let server = RecordingServer::start(
        "/wp-content/debug.log",
        padded("PHP Warning: Undefined array key", 400),
        false,
    )
    .await;

    let url = format!("{}/wp-content/debug.log", server.base);
    let finding = DebugLogProber.probe(&client(), &url).await.expect("finding");

    assert_eq!(finding.kind, FindingKind::ConfirmedLog);
    assert_eq!(finding.size, None);
    assert_eq!(finding.display_size(), -1);
}
