#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use jobtrack_client::{ClientConfig, JobHandle, JobTracker, RetryPolicy};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub const API_KEY: &str = "sk_test_123";

/// Retry policy with millisecond delays so retry tests stay fast.
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        max_jitter: 0.0,
    }
}

pub fn config(base_url: &str) -> ClientConfig {
    ClientConfig::new(API_KEY)
        .base_url(base_url)
        .timeout(Duration::from_secs(5))
        .retry(fast_retry(3))
}

pub fn tracker(base_url: &str) -> JobTracker {
    JobTracker::new(config(base_url)).unwrap()
}

pub fn job_json(id: &str, status: &str, progress: f64) -> Value {
    json!({
        "id": id,
        "appId": "app_1",
        "userId": "u1",
        "jobType": "video-generation",
        "title": "t",
        "status": status,
        "progress": progress,
        "metadata": {},
        "createdAt": "2027-01-15T10:00:00Z",
        "updatedAt": "2027-01-15T10:00:00Z"
    })
}

/// Handle over a job that already exists server-side, without a create call.
pub fn existing(tracker: &JobTracker, id: &str, status: &str, progress: f64) -> JobHandle {
    tracker.handle(serde_json::from_value(job_json(id, status, progress)).unwrap())
}

pub fn error_json(code: &str, message: &str) -> String {
    json!({ "error": { "code": code, "message": message } }).to_string()
}

/// One request as seen by [`scripted_server`].
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub body: Value,
}

/// Minimal HTTP/1.1 server where every request is answered by `respond`,
/// which may await (e.g. on a barrier) before returning `(status, body)`.
/// Connections are served concurrently. Returns the base URL.
pub async fn scripted_server<F, Fut>(respond: F) -> String
where
    F: Fn(Seen) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, Value)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let respond = Arc::clone(&respond);
            tokio::spawn(async move { serve_connection(socket, respond.as_ref()).await });
        }
    });

    format!("http://{addr}")
}

async fn serve_connection<F, Fut>(socket: TcpStream, respond: &F)
where
    F: Fn(Seen) -> Fut,
    Fut: Future<Output = (u16, Value)>,
{
    let mut reader = BufReader::new(socket);
    while let Some(seen) = read_request(&mut reader).await {
        let (status, body) = respond(seen).await;
        let body = if body.is_null() { String::new() } else { body.to_string() };
        let head = format!(
            "HTTP/1.1 {status} Scripted\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n",
            body.len()
        );
        let socket = reader.get_mut();
        if socket.write_all(head.as_bytes()).await.is_err()
            || socket.write_all(body.as_bytes()).await.is_err()
        {
            return;
        }
    }
}

async fn read_request(reader: &mut BufReader<TcpStream>) -> Option<Seen> {
    let mut line = String::new();
    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).await.ok()? == 0 {
            return None;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok()?;
            }
        }
    }

    let mut raw = vec![0u8; content_length];
    reader.read_exact(&mut raw).await.ok()?;
    let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
    Some(Seen { method, path, body })
}
