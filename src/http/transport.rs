//! The byte-level boundary between a connection and its socket.
//!
//! A [`Protocol`] is told about inbound bytes and closure; it answers through
//! a [`Transport`], which only knows how to queue outbound bytes and how to
//! shut the connection down.

use std::cell::Cell;
use std::fmt;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;

/// Why a connection went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer closed its side.
    PeerClosed,
    /// We closed it, after a response or a protocol error.
    Local,
    /// The socket failed.
    Error(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerClosed => write!(f, "closed by peer"),
            CloseReason::Local => write!(f, "closed locally"),
            CloseReason::Error(e) => write!(f, "socket error: {}", e),
        }
    }
}

/// Outbound side of a connection.
pub trait Transport {
    /// Appends bytes to the outbound stream.
    fn write(&self, data: Bytes);

    /// Starts a graceful shutdown once queued bytes are out.
    fn close(&self);
}

/// Inbound callbacks a transport drives.
pub trait Protocol {
    fn data_received(&mut self, data: &[u8]);

    fn connection_lost(&mut self, reason: CloseReason);
}

/// Work for the socket writer task.
#[derive(Debug)]
pub enum Outgoing {
    Data(Bytes),
    Close,
}

/// Transport over a tokio TCP socket.
///
/// Writes go onto an unbounded channel drained by [`run_writer`], so they can
/// be issued from synchronous callbacks.
#[derive(Debug)]
pub struct TcpTransport {
    tx: mpsc::UnboundedSender<Outgoing>,
    closing: Cell<bool>,
}

impl TcpTransport {
    pub fn new(tx: mpsc::UnboundedSender<Outgoing>) -> Self {
        Self {
            tx,
            closing: Cell::new(false),
        }
    }
}

impl Transport for TcpTransport {
    fn write(&self, data: Bytes) {
        if self.closing.get() {
            tracing::warn!(len = data.len(), "Write after close dropped");
            return;
        }
        if self.tx.send(Outgoing::Data(data)).is_err() {
            tracing::debug!("Writer already gone, dropping data");
        }
    }

    fn close(&self) {
        if self.closing.replace(true) {
            return;
        }
        let _ = self.tx.send(Outgoing::Close);
    }
}

/// Drains queued output into the socket until closed.
///
/// Returns once `Close` has been processed, the channel is dropped, or a
/// write fails.
pub async fn run_writer(
    mut rx: mpsc::UnboundedReceiver<Outgoing>,
    mut stream: OwnedWriteHalf,
) -> anyhow::Result<()> {
    while let Some(item) = rx.recv().await {
        match item {
            Outgoing::Data(data) => {
                stream.write_all(&data).await?;
            }
            Outgoing::Close => break,
        }
    }

    stream.flush().await?;
    stream.shutdown().await?;
    Ok(())
}
