//! In-process HTTP server management.

#![allow(dead_code)]

use chatd::http::{HttpState, run_http_server};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// An HTTP server task bound to a fixed local port.
pub struct TestServer {
    handle: JoinHandle<()>,
    port: u16,
}

impl TestServer {
    /// Spawn the server and wait until it accepts connections.
    pub async fn spawn(port: u16, state: HttpState) -> anyhow::Result<Self> {
        let handle = tokio::spawn(run_http_server(port, state));
        let server = Self { handle, port };

        for _ in 0..50 {
            if TcpStream::connect(server.address()).await.is_ok() {
                return Ok(server);
            }
            sleep(Duration::from_millis(20)).await;
        }
        anyhow::bail!("HTTP server did not start on port {port}")
    }

    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Issue a bare HTTP/1.1 GET and return the status code and body.
pub async fn http_get(address: &str, path: &str) -> anyhow::Result<(u16, String)> {
    let mut stream = TcpStream::connect(address).await?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: {address}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;
    let response = String::from_utf8(raw)?;

    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("malformed status line"))?;
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    Ok((status, body))
}
