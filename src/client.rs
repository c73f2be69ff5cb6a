//! Protocol client.
//!
//! A thin async client that sends one request at a time and waits for its
//! reply. Used by `hashkv-cli` and the end-to-end tests.
//!
//! ```ignore
//! use hashkv::client::Client;
//!
//! let mut client = Client::connect("127.0.0.1:6379").await?;
//! client.set("name", "Ariz").await?;
//! let reply = client.get("name").await?;
//! ```

use crate::protocol::{
    decode_reply, encode_request, read_frame, write_frame, FrameError, Reply, MAX_FRAME_SIZE,
};
use thiserror::Error;
use tokio::io::BufWriter;
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::trace;

/// Errors returned by [`Client`].
///
/// A server-side command error is not a `ClientError`: it arrives as
/// `Reply::Err`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Server closed the connection")]
    ConnectionClosed,
}

/// A connection to a HashKV server.
pub struct Client {
    stream: BufWriter<TcpStream>,
}

impl Client {
    /// Connects to a server.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream: BufWriter::new(stream),
        })
    }

    /// Sends a raw token list and waits for the reply.
    pub async fn command<T: AsRef<[u8]>>(&mut self, tokens: &[T]) -> Result<Reply, ClientError> {
        let frame = encode_request(tokens)?;
        write_frame(&mut self.stream, &frame).await?;

        let payload = read_frame(&mut self.stream, MAX_FRAME_SIZE)
            .await?
            .ok_or(ClientError::ConnectionClosed)?;
        let reply = decode_reply(payload)?;
        trace!(reply = %reply, "Received reply");

        Ok(reply)
    }

    pub async fn get(&mut self, key: impl AsRef<[u8]>) -> Result<Reply, ClientError> {
        self.command(&[b"get".as_slice(), key.as_ref()]).await
    }

    pub async fn set(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Result<Reply, ClientError> {
        self.command(&[b"set".as_slice(), key.as_ref(), value.as_ref()])
            .await
    }

    pub async fn del(&mut self, key: impl AsRef<[u8]>) -> Result<Reply, ClientError> {
        self.command(&[b"del".as_slice(), key.as_ref()]).await
    }

    pub async fn keys(&mut self) -> Result<Reply, ClientError> {
        self.command(&["keys"]).await
    }
}
