//! Shared fixtures for runtime integration tests.
//!
//! `TestServer` is a minimal HTTP/1.1 server on a random local port. Each
//! route maps a raw request path (exactly as sent, percent-escapes intact)
//! to a canned response.

#![allow(dead_code)]

use async_trait::async_trait;
use binwrap_core::{BinWrapResult, Downloader};
use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

pub struct TestServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub async fn start(routes: Vec<(&str, Response)>) -> Self {
        let routes: Arc<HashMap<String, Response>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, resp)| (path.to_string(), resp))
                .collect(),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let routes = Arc::clone(&routes);
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    counter.fetch_add(1, Ordering::SeqCst);

                    let head = String::from_utf8_lossy(&request);
                    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let response = routes
                        .get(&path)
                        .cloned()
                        .unwrap_or_else(|| Response::status(404));

                    let _ = socket.write_all(&encode(&response)).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn encode(response: &Response) -> Vec<u8> {
    let reason = match response.status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };
    let mut out = Vec::new();
    write!(out, "HTTP/1.1 {} {}\r\n", response.status, reason).unwrap();
    write!(out, "Content-Length: {}\r\n", response.body.len()).unwrap();
    write!(out, "Connection: close\r\n").unwrap();
    for (name, value) in &response.headers {
        write!(out, "{name}: {value}\r\n").unwrap();
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(&response.body);
    out
}

/// Downloader that writes fixed bytes and counts calls.
pub struct CountingDownloader {
    pub calls: AtomicUsize,
    pub file_name: String,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl CountingDownloader {
    pub fn new(file_name: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            file_name: file_name.to_string(),
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downloader for CountingDownloader {
    async fn download(&self, _url: &str, dest_dir: &Path) -> BinWrapResult<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        std::fs::create_dir_all(dest_dir).unwrap();
        let path = dest_dir.join(&self.file_name);
        std::fs::write(&path, &self.body).unwrap();
        Ok(path)
    }
}

/// A tar.gz holding `entries` with mode 0755.
pub fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    let tar = builder.into_inner().unwrap();

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&tar).unwrap();
    encoder.finish().unwrap()
}

/// Write an executable shell script.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
