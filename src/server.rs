//! Accept loop.
//!
//! Runs on its own task, spawning one connection task per accepted socket.
//! Connection failures stay inside their task; only a listener failure
//! ends the loop.

use crate::commands::CommandHandler;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::Store;
use std::future::Future;
use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, warn};

/// Pause before retrying after the process ran out of descriptors or memory.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Source of incoming connections for the accept loop.
trait Acceptor {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send + '_;
}

impl Acceptor for TcpListener {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send + '_ {
        TcpListener::accept(self)
    }
}

/// What the accept loop does with a failed `accept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcceptFailure {
    /// The pending connection died before it was accepted
    Connection,
    /// Out of descriptors, buffers or memory; clears once connections close
    Exhausted,
    /// The listener itself is unusable
    Listener,
}

/// Accepts connections until the listener fails.
///
/// Equivalent to [`serve_with_stats`] with fresh statistics.
pub async fn serve(listener: TcpListener, store: Arc<Store>) -> io::Result<()> {
    serve_with_stats(listener, store, Arc::new(ConnectionStats::new())).await
}

/// Accepts connections until the listener fails, recording into `stats`.
///
/// Errors tied to a single incoming connection (reset or aborted before
/// accept completed) are logged and skipped. Resource exhaustion such as
/// `EMFILE` is logged, and accepting resumes after a short pause. Only an
/// error that leaves the listener unusable is returned.
pub async fn serve_with_stats(
    listener: TcpListener,
    store: Arc<Store>,
    stats: Arc<ConnectionStats>,
) -> io::Result<()> {
    accept_loop(&listener, store, stats).await
}

async fn accept_loop<A: Acceptor>(
    listener: &A,
    store: Arc<Store>,
    stats: Arc<ConnectionStats>,
) -> io::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!(client = %addr, "Accepted connection");

                let handler = CommandHandler::new(Arc::clone(&store));
                let stats = Arc::clone(&stats);

                tokio::spawn(handle_connection(stream, addr, handler, stats));
            }
            Err(e) => match classify_accept_error(&e) {
                AcceptFailure::Connection => {
                    warn!(error = %e, "Failed to accept connection");
                }
                AcceptFailure::Exhausted => {
                    warn!(
                        error = %e,
                        backoff_ms = ACCEPT_BACKOFF.as_millis() as u64,
                        "Out of resources while accepting, retrying"
                    );
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
                AcceptFailure::Listener => {
                    error!(error = %e, "Listener failed");
                    return Err(e);
                }
            },
        }
    }
}

// errno values shared by Linux and the BSDs
const ENOMEM: i32 = 12;
const ENFILE: i32 = 23;
const EMFILE: i32 = 24;
#[cfg(target_os = "linux")]
const ENOBUFS: i32 = 105;
#[cfg(not(target_os = "linux"))]
const ENOBUFS: i32 = 55;

fn classify_accept_error(e: &io::Error) -> AcceptFailure {
    match e.kind() {
        ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::Interrupted => {
            AcceptFailure::Connection
        }
        ErrorKind::OutOfMemory => AcceptFailure::Exhausted,
        _ => match e.raw_os_error() {
            Some(ENOMEM | ENFILE | EMFILE | ENOBUFS) => AcceptFailure::Exhausted,
            _ => AcceptFailure::Listener,
        },
    }
}
