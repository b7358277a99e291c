//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the connect phase of a backend call
//! - Bound every individual read and write on a backend connection
//! - Surface expiry as `io::ErrorKind::TimedOut` so callers can classify it
//!
//! # Design Decisions
//! - Uses Tokio's timer facilities
//! - A deadline is armed when an operation first returns `Pending` and
//!   disarmed as soon as it makes progress, so slow-but-steady transfers
//!   are not cut off
//! - Write progress also restarts the read clock: a request still uploading
//!   is not yet waiting on the backend's answer
//! - Dropping the stream cancels everything; no background tasks

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::Sleep;

/// The three independent bounds applied to a backend exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            read: Duration::from_secs(30),
            write: Duration::from_secs(30),
        }
    }
}

impl From<&crate::config::TimeoutConfig> for Timeouts {
    fn from(config: &crate::config::TimeoutConfig) -> Self {
        Self {
            connect: config.connect(),
            read: config.read(),
            write: config.write(),
        }
    }
}

/// Resolve and connect to `host:port` within `timeout`.
pub async fn connect_with_timeout(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<TcpStream, ConnectError> {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            // Latency matters more than throughput for proxied exchanges.
            let _ = stream.set_nodelay(true);
            Ok(stream)
        }
        Ok(Err(e)) => Err(ConnectError::Io(e)),
        Err(_) => Err(ConnectError::TimedOut(timeout)),
    }
}

/// Failure of [`connect_with_timeout`].
#[derive(Debug)]
pub enum ConnectError {
    Io(io::Error),
    TimedOut(Duration),
}

/// Stream wrapper that fails stalled reads and writes.
#[derive(Debug)]
pub struct TimedIo<S> {
    inner: S,
    read_timeout: Duration,
    write_timeout: Duration,
    read_deadline: Option<Pin<Box<Sleep>>>,
    write_deadline: Option<Pin<Box<Sleep>>>,
}

impl<S> TimedIo<S> {
    pub fn new(inner: S, read_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            inner,
            read_timeout,
            write_timeout,
            read_deadline: None,
            write_deadline: None,
        }
    }
}

/// Arm the deadline if needed and report whether it has expired.
fn deadline_expired(
    slot: &mut Option<Pin<Box<Sleep>>>,
    timeout: Duration,
    cx: &mut Context<'_>,
) -> bool {
    let sleep = slot.get_or_insert_with(|| Box::pin(tokio::time::sleep(timeout)));
    if sleep.as_mut().poll(cx).is_ready() {
        *slot = None;
        true
    } else {
        false
    }
}

fn timed_out(op: &str, timeout: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("backend {op} timed out after {timeout:?}"),
    )
}

impl<S: AsyncRead + Unpin> AsyncRead for TimedIo<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(result) => {
                this.read_deadline = None;
                Poll::Ready(result)
            }
            Poll::Pending => {
                if deadline_expired(&mut this.read_deadline, this.read_timeout, cx) {
                    Poll::Ready(Err(timed_out("read", this.read_timeout)))
                } else {
                    Poll::Pending
                }
            }
        }
    }
}

impl<S: AsyncWrite + Unpin> TimedIo<S> {
    fn poll_write_op<T>(
        &mut self,
        cx: &mut Context<'_>,
        op: impl FnOnce(Pin<&mut S>, &mut Context<'_>) -> Poll<io::Result<T>>,
    ) -> Poll<io::Result<T>> {
        match op(Pin::new(&mut self.inner), cx) {
            Poll::Ready(result) => {
                self.write_deadline = None;
                if result.is_ok() {
                    self.read_deadline = None;
                }
                Poll::Ready(result)
            }
            Poll::Pending => {
                if deadline_expired(&mut self.write_deadline, self.write_timeout, cx) {
                    Poll::Ready(Err(timed_out("write", self.write_timeout)))
                } else {
                    Poll::Pending
                }
            }
        }
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for TimedIo<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.get_mut().poll_write_op(cx, |s, cx| s.poll_write(cx, buf))
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        self.get_mut()
            .poll_write_op(cx, |s, cx| s.poll_write_vectored(cx, bufs))
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().poll_write_op(cx, |s, cx| s.poll_flush(cx))
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().poll_write_op(cx, |s, cx| s.poll_shutdown(cx))
    }
}
