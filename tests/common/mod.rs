//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::mpsc;

use route_proxy::config::ProxyConfig;
use route_proxy::http::HttpServer;
use route_proxy::lifecycle::Shutdown;

/// One request as the backend saw it on the wire.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// e.g. `GET /users?id=1 HTTP/1.1`
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_in(&self.head, name)
    }

    pub fn header_count(&self, name: &str) -> usize {
        self.head
            .lines()
            .skip(1)
            .filter(|line| {
                line.split_once(':')
                    .is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            })
            .count()
    }
}

/// Build a raw `HTTP/1.1` response with a correct Content-Length.
pub fn raw_response(status_line: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!("HTTP/1.1 {status_line}\r\n");
    for (name, value) in headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    ));
    response
}

/// Build a raw `HTTP/1.1` response whose body is sent in the given chunks.
pub fn chunked_response(status_line: &str, chunks: &[&str]) -> String {
    let mut response = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\nConnection: keep-alive\r\n\r\n"
    );
    for chunk in chunks {
        response.push_str(&format!("{:x}\r\n{chunk}\r\n", chunk.len()));
    }
    response.push_str("0\r\n\r\n");
    response
}

/// Build a raw `HTTP/1.1` response delimited by closing the connection.
pub fn close_delimited_response(status_line: &str, body: &str) -> String {
    format!("HTTP/1.1 {status_line}\r\nConnection: close\r\n\r\n{body}")
}

/// Start a backend that records every request and answers with `response`.
pub async fn start_recording_backend(
    response: String,
) -> (SocketAddr, mpsc::UnboundedReceiver<RecordedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            let response = response.clone();
            tokio::spawn(async move {
                if let Some(request) = read_request(&mut socket).await {
                    let _ = tx.send(request);
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

/// Start a backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(socket);
            });
        }
    });

    addr
}

/// Start a backend that drains request bodies at a fixed pace: a pause of
/// `pause` after every `chunk` bytes. Its receive buffer is kept small so the
/// pace reaches the sender. Reports each body length, then answers with
/// `response`.
pub async fn start_draining_backend(
    chunk: usize,
    pause: Duration,
    response: String,
) -> (SocketAddr, mpsc::UnboundedReceiver<usize>) {
    let socket = TcpSocket::new_v4().unwrap();
    socket.set_recv_buffer_size(64 * 1024).unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let listener = socket.listen(16).unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            let response = response.clone();
            tokio::spawn(async move {
                let Some((head, body)) = read_head(&mut socket).await else {
                    return;
                };
                let length = content_length(&head);
                let mut received = body.len();
                let mut since_pause = received;
                let mut buf = vec![0u8; chunk];
                while received < length {
                    if since_pause >= chunk {
                        tokio::time::sleep(pause).await;
                        since_pause -= chunk;
                    }
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => {
                            received += n;
                            since_pause += n;
                        }
                    }
                }
                let _ = tx.send(received);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

/// An address with nothing listening on it.
pub async fn refused_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Run the proxy on an ephemeral port over plain HTTP.
pub async fn spawn_proxy(mut config: ProxyConfig) -> (SocketAddr, Shutdown) {
    config.listener.tls = None;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// HTTP client that ignores any proxy settings in the environment.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Read up to the end of the request head. Returns the head and any body
/// bytes that arrived with it.
async fn read_head(socket: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    Some((head, buf[head_end + 4..].to_vec()))
}

fn header_in<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}

fn content_length(head: &str) -> usize {
    header_in(head, "content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let (head, body) = read_head(socket).await?;
    let length = content_length(&head);
    let mut request = RecordedRequest { head, body };
    let mut chunk = [0u8; 4096];

    while request.body.len() < length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        request.body.extend_from_slice(&chunk[..n]);
    }

    Some(request)
}
