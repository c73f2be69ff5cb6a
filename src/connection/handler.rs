//! Connection Handler Module
//!
//! This module handles individual client connections to HashKV.
//! Each client gets its own handler task that runs in a loop,
//! reading one request and writing one reply at a time.
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
//!    │  │ Read one framed request │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Parse tokens            │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Execute command         │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Write one framed reply  │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. Client disconnects / I/O error / framing error
//!        │
//!        ▼
//! 5. Handler dropped, socket closed
//! ```
//!
//! ## Failure Handling
//!
//! A command error is just another reply and the loop continues. A framing
//! error or an I/O error ends the loop without a reply: once a declared
//! length is wrong the stream is no longer self-delimiting.
//!
//! There are no read or write deadlines. A stalled peer keeps its task
//! alive until the socket call returns.

use crate::commands::CommandHandler;
use crate::protocol::{
    parse_request, read_frame, write_frame, FrameError, Reply, LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE,
};
use bytes::Bytes;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

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
/// Generic over the stream so it can run on a `TcpStream` or on any other
/// async byte stream. Dropping the handler closes the stream and releases
/// its slot in [`ConnectionStats`], on every exit path.
pub struct ConnectionHandler<S> {
    /// The client stream. Reads pass straight through the write buffer.
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// The command handler (shared store behind it)
    command_handler: CommandHandler,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream
    /// * `addr` - The client's socket address
    /// * `command_handler` - The command handler for executing commands
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            command_handler,
            stats,
        }
    }

    /// Runs the main connection loop.
    ///
    /// Returns once the client disconnects or the connection fails. The
    /// loop itself has no successful exit.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let err = match self.main_loop().await {
            Err(e) => e,
            Ok(never) => match never {},
        };

        if err.is_disconnect() {
            debug!(client = %self.addr, reason = %err, "Client disconnected");
            Ok(())
        } else {
            warn!(client = %self.addr, error = %err, "Connection error");
            Err(err)
        }
    }

    /// The read-execute-respond loop.
    ///
    /// Request `i + 1` is not read until the reply to request `i` has been
    /// written and flushed.
    async fn main_loop(&mut self) -> Result<std::convert::Infallible, ConnectionError> {
        loop {
            let tokens = self.read_request().await?;

            let reply = self.command_handler.execute(tokens);
            self.stats.command_processed();

            self.send_reply(&reply).await?;
        }
    }

    /// Reads and parses exactly one request.
    async fn read_request(&mut self) -> Result<Vec<Bytes>, ConnectionError> {
        let payload = read_frame(&mut self.stream, MAX_FRAME_SIZE)
            .await?
            .ok_or(ConnectionError::ClientDisconnected)?;
        self.stats.bytes_read(LENGTH_PREFIX_SIZE + payload.len());

        let tokens = parse_request(payload)?;
        trace!(
            client = %self.addr,
            tokens = tokens.len(),
            "Parsed request"
        );

        Ok(tokens)
    }

    /// Sends a reply to the client.
    async fn send_reply(&mut self, reply: &Reply) -> Result<(), ConnectionError> {
        let frame = reply.to_frame();
        write_frame(&mut self.stream, &frame).await?;
        self.stats.bytes_written(frame.len());
        trace!(
            client = %self.addr,
            bytes = frame.len(),
            "Sent reply"
        );
        Ok(())
    }
}

impl<S> Drop for ConnectionHandler<S> {
    fn drop(&mut self) {
        self.stats.connection_closed();
    }
}

/// Errors that end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error while writing (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed or truncated frame, or an I/O error while reading one
    #[error("Frame error: {0}")]
    FrameError(#[from] FrameError),

    /// Client closed the connection between requests
    #[error("Client disconnected")]
    ClientDisconnected,
}

impl ConnectionError {
    /// Returns true if this error is the peer going away rather than a fault.
    pub fn is_disconnect(&self) -> bool {
        let io_err = match self {
            ConnectionError::ClientDisconnected => return true,
            ConnectionError::IoError(e) | ConnectionError::FrameError(FrameError::Io(e)) => e,
            _ => return false,
        };

        matches!(
            io_err.kind(),
            ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
        )
    }
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. Errors are logged by the handler and never
/// propagate further.
///
/// # Arguments
///
/// * `stream` - The TCP stream for this connection
/// * `addr` - The client's socket address
/// * `command_handler` - The command handler for executing commands
/// * `stats` - Shared connection statistics
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) {
    // Replies are small and written one per request
    if let Err(e) = stream.set_nodelay(true) {
        debug!(client = %addr, error = %e, "Failed to set TCP_NODELAY");
    }

    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    let _ = handler.run().await;
}
