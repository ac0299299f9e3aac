#![allow(dead_code)]

use std::{
    io::{Read, Write},
    sync::{Arc, Mutex},
    thread,
};

use async_trait::async_trait;
use cd_metrics_core::{DispatchError, LogLine, LogSink, Transport};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    sync::mpsc,
    time::Instant,
};

#[derive(Debug, Clone)]
pub struct Sent {
    pub endpoint: String,
    pub body: String,
    pub at: Instant,
}

/// Transport that records every send and answers with a fixed result.
pub struct RecordingTransport {
    reply: Result<u16, DispatchError>,
    sent: Mutex<Vec<Sent>>,
    notify: mpsc::UnboundedSender<Sent>,
}

impl RecordingTransport {
    pub fn new(reply: Result<u16, DispatchError>) -> (Arc<Self>, mpsc::UnboundedReceiver<Sent>) {
        let (notify, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            reply,
            sent: Mutex::new(Vec::new()),
            notify,
        });
        (transport, rx)
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, endpoint: &str, body: String) -> Result<u16, DispatchError> {
        let sent = Sent {
            endpoint: endpoint.to_string(),
            body,
            at: Instant::now(),
        };
        self.sent.lock().unwrap().push(sent.clone());
        let _ = self.notify.send(sent);
        self.reply.clone()
    }
}

/// Sink that keeps every line it receives.
#[derive(Clone, Default)]
pub struct CollectingSink {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl CollectingSink {
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().unwrap().clone()
    }

    pub fn terminal_lines(&self) -> Vec<LogLine> {
        self.lines()
            .into_iter()
            .filter(|line| line.is_terminal())
            .collect()
    }
}

impl LogSink for CollectingSink {
    fn log(&self, line: &LogLine) {
        self.lines.lock().unwrap().push(line.clone());
    }
}

/// A request as seen by the test server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

fn split_request(raw: &[u8]) -> Option<(String, usize, usize)> {
    let text = String::from_utf8_lossy(raw);
    let end = text.find("\r\n\r\n")?;
    let head = text[..end].to_string();
    let length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    Some((head, end + 4, length))
}

fn response(status: u16) -> String {
    format!(
        "HTTP/1.1 {} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status
    )
}

/// Serve one request on a Tokio listener and answer with `status`.
pub async fn serve_once(status: u16) -> (String, tokio::sync::oneshot::Receiver<CapturedRequest>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/batch", listener.local_addr().unwrap());
    let (tx, rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if let Some((head, body_start, length)) = split_request(&raw) {
                if raw.len() >= body_start + length {
                    let body = String::from_utf8_lossy(&raw[body_start..body_start + length]);
                    let _ = tx.send(CapturedRequest {
                        head,
                        body: body.into_owned(),
                    });
                    break;
                }
            }
        }
        socket.write_all(response(status).as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });

    (url, rx)
}

/// Blocking counterpart of [`serve_once`] for tests without a runtime.
///
/// With `status == None` the connection is held open without an answer.
pub fn serve_once_blocking(status: Option<u16>) -> (String, std::sync::mpsc::Receiver<CapturedRequest>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/batch", listener.local_addr().unwrap());
    let (tx, rx) = std::sync::mpsc::channel();

    thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).unwrap_or(0);
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if let Some((head, body_start, length)) = split_request(&raw) {
                if raw.len() >= body_start + length {
                    let body = String::from_utf8_lossy(&raw[body_start..body_start + length]);
                    let _ = tx.send(CapturedRequest {
                        head,
                        body: body.into_owned(),
                    });
                    break;
                }
            }
        }
        match status {
            Some(status) => {
                let _ = socket.write_all(response(status).as_bytes());
            }
            None => thread::sleep(std::time::Duration::from_secs(5)),
        }
    });

    (url, rx)
}
