//! Common test utilities for bets integration tests
//!
//! A minimal HTTP server standing in for the bets engine, and a scripted
//! bet source for driving the monitor without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use bets::{ApiError, Bet, BetId, BetSource};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::time::Instant;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Bet record in the shape the API returns
pub fn bet(id: BetId, state: &str) -> Bet {
    serde_json::from_value(bet_json(id, state)).unwrap()
}

pub fn bet_json(id: BetId, state: &str) -> Value {
    json!({
        "id": id,
        "state": state,
        "description": format!("Bet {}", id),
        "stakes": [],
    })
}

/// Successful listing payload
pub fn listing(bets: Vec<Value>, next: Option<String>) -> Value {
    json!({
        "status": "ok",
        "bets": {
            "results": bets,
            "next": next,
        }
    })
}

// ============================================================================
// Mock HTTP server
// ============================================================================

/// Response served for one request
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl CannedResponse {
    pub fn json(value: Value) -> Self {
        Self::text(value.to_string())
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decoded `application/x-www-form-urlencoded` body fields, in order
    pub fn form(&self) -> Vec<(String, String)> {
        self.body
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect()
    }
}

fn decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap();
                out.push(u8::from_str_radix(hex, 16).unwrap());
                i += 2;
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8(out).unwrap()
}

/// Serves queued responses in order, one per connection
pub struct MockHttpServer {
    pub addr: SocketAddr,
    responses: Arc<Mutex<VecDeque<CannedResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Arc<Notify>,
}

impl MockHttpServer {
    /// Create and start a new mock server
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let responses = Arc::new(Mutex::new(VecDeque::new()));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(Notify::new());

        let (responses_clone, requests_clone, shutdown_clone) =
            (responses.clone(), requests.clone(), shutdown.clone());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let responses = responses_clone.clone();
                                let requests = requests_clone.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, responses, requests).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            responses,
            requests,
            shutdown,
        }
    }

    async fn handle_connection(
        mut stream: TcpStream,
        responses: Arc<Mutex<VecDeque<CannedResponse>>>,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
    ) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap_or_default().split_whitespace();
        let method = request_line.next().unwrap_or_default().to_string();
        let target = request_line.next().unwrap_or_default().to_string();

        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        let body_end = buf.len().min(header_end + content_length);
        let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

        requests.lock().push(RecordedRequest {
            method,
            target,
            headers,
            body,
        });

        let response = responses.lock().pop_front().unwrap_or_else(|| {
            CannedResponse::json(json!({"status": "error", "detail": "no response queued"}))
                .with_status(404)
        });

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }

        let raw = format!(
            "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            response.status,
            response.body.len(),
            response.body
        );
        let _ = stream.write_all(raw.as_bytes()).await;
        let _ = stream.shutdown().await;
    }

    /// Base URL of this server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn enqueue(&self, response: CannedResponse) {
        self.responses.lock().push_back(response);
    }

    pub fn enqueue_json(&self, value: Value) {
        self.enqueue(CannedResponse::json(value));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ============================================================================
// Scripted bet source
// ============================================================================

/// Bet source replaying queued replies
///
/// Once the queue is empty every fetch returns no records.
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<VecDeque<Result<Vec<Bet>, ApiError>>>,
    calls: Mutex<Vec<(Instant, Vec<BetId>)>>,
    delay: Duration,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch takes `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push_ok(&self, bets: Vec<Bet>) {
        self.replies.lock().push_back(Ok(bets));
    }

    pub fn push_err(&self, error: ApiError) {
        self.replies.lock().push_back(Err(error));
    }

    /// Requested ids of every fetch so far
    pub fn calls(&self) -> Vec<Vec<BetId>> {
        self.calls.lock().iter().map(|(_, ids)| ids.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().iter().map(|(at, _)| *at).collect()
    }
}

#[async_trait]
impl BetSource for ScriptedSource {
    async fn fetch_by_ids(&self, ids: &[BetId]) -> Result<Vec<Bet>, ApiError> {
        self.calls.lock().push((Instant::now(), ids.to_vec()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.replies.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}
