//! Connection Handler Module
//!
//! This module handles individual client connections to LineKV.
//! Each client gets its own handler task that runs in a loop,
//! reading request lines and sending replies.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Read bytes from socket  │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Split off a full line   │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Execute command         │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Send reply + newline    │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. Client disconnects / error
//!        │
//!        ▼
//! 5. Handler task ends
//! ```
//!
//! ## Buffer Management
//!
//! TCP is a stream: a read may carry half a line or several lines. Bytes
//! accumulate in a `BytesMut` and complete lines are split off the front.
//! When the client closes its side, whatever is left in the buffer is run
//! as one last line.

use crate::commands::CommandHandler;
use crate::protocol::{LineParser, ParseError, Reply, DEFAULT_MAX_LINE};
use bytes::{Buf, BytesMut};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Generic over the stream so the loop can run on a `TcpStream` or on an
/// in-memory mock.
pub struct ConnectionHandler<S> {
    /// The client stream
    stream: BufWriter<S>,

    /// Client identity for logging (usually the socket address)
    peer: String,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The command handler (shared storage)
    command_handler: CommandHandler,

    /// Line framing
    parser: LineParser,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler with the default line limit.
    pub fn new(
        stream: S,
        peer: impl Display,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        Self::with_max_line(stream, peer, command_handler, stats, DEFAULT_MAX_LINE)
    }

    /// Creates a new connection handler that rejects lines over `max_line` bytes.
    pub fn with_max_line(
        stream: S,
        peer: impl Display,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
        max_line: usize,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            peer: peer.to_string(),
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            parser: LineParser::new(max_line),
            stats,
        }
    }

    /// Runs the main connection loop until the client goes away or an
    /// error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.peer, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.peer, "Client disconnected gracefully"),
            Err(ConnectionError::ClientDisconnected) => {
                info!(client = %self.peer, "Client disconnected")
            }
            Err(ConnectionError::IoError(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.peer, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.peer, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    /// The main read-execute-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(line) = self.try_parse_line()? {
                self.execute_line(&line).await?;
            }

            if !self.read_more_data().await? {
                break;
            }
        }

        // The peer closed its side; an unterminated last line still runs
        if let Some(line) = self.parser.parse_final(&self.buffer)? {
            self.buffer.clear();
            self.execute_line(&line).await?;
        }

        Err(ConnectionError::ClientDisconnected)
    }

    async fn execute_line(&mut self, line: &str) -> Result<(), ConnectionError> {
        trace!(client = %self.peer, line = %line, "Received command");

        let reply = self.command_handler.execute(line);
        self.stats.command_processed();

        self.send_reply(&reply).await
    }

    /// Attempts to split one complete line off the buffer.
    fn try_parse_line(&mut self) -> Result<Option<String>, ConnectionError> {
        match self.parser.parse(&self.buffer) {
            Ok(Some((line, consumed))) => {
                self.buffer.advance(consumed);
                Ok(Some(line))
            }
            Ok(None) => {
                trace!(
                    client = %self.peer,
                    buffered = self.buffer.len(),
                    "Incomplete line, need more data"
                );
                Ok(None)
            }
            Err(e) => {
                warn!(client = %self.peer, error = %e, "Parse error");
                Err(ConnectionError::ParseError(e))
            }
        }
    }

    /// Reads more data from the stream into the buffer.
    ///
    /// Returns `false` once the peer has closed its side.
    async fn read_more_data(&mut self) -> Result<bool, ConnectionError> {
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            return Ok(false);
        }

        self.stats.bytes_read(n);
        trace!(client = %self.peer, bytes = n, "Read data");

        Ok(true)
    }

    /// Sends a reply followed by a newline.
    async fn send_reply(&mut self, reply: &Reply) -> Result<(), ConnectionError> {
        let bytes = reply.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(client = %self.peer, bytes = bytes.len(), "Sent reply");
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Framing error (oversized line or bad UTF-8)
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,
}

/// Handles a client connection.
///
/// Creates a [`ConnectionHandler`] and runs it to completion, logging how
/// it ended.
pub async fn handle_connection<S>(
    stream: S,
    peer: impl Display,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
    max_line: usize,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let peer = peer.to_string();
    let handler =
        ConnectionHandler::with_max_line(stream, &peer, command_handler, stats, max_line);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %peer, error = %e, "Connection ended with error");
            }
        }
    }
}
