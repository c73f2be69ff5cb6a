//! Async frame I/O
//!
//! Reads and writes single length-prefixed frames over any tokio stream.
//! Exactly one frame is read per call, so a reader never consumes bytes
//! belonging to the next request.

use crate::protocol::codec::{FrameError, FrameResult};
use crate::protocol::types::LENGTH_PREFIX_SIZE;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on the buffer reserved before any payload byte has arrived.
const INITIAL_PAYLOAD_CAPACITY: usize = 64 * 1024;

/// Reads one frame and returns its payload.
///
/// # Returns
///
/// - `Ok(Some(payload))` - a complete frame was read
/// - `Ok(None)` - the stream closed cleanly on a frame boundary
/// - `Err(FrameError::UnexpectedEof)` - the stream closed inside a frame
/// - `Err(FrameError::TooLarge { .. })` - the declared length exceeds `max_size`
pub async fn read_frame<R>(reader: &mut R, max_size: usize) -> FrameResult<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; LENGTH_PREFIX_SIZE];
    let mut filled = 0;

    while filled < LENGTH_PREFIX_SIZE {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                Err(FrameError::UnexpectedEof)
            };
        }
        filled += n;
    }

    let len = u32::from_be_bytes(header) as usize;
    if len > max_size {
        return Err(FrameError::TooLarge {
            size: len,
            max: max_size,
        });
    }

    // Grow with the bytes actually received rather than the declared length
    let mut payload = Vec::with_capacity(len.min(INITIAL_PAYLOAD_CAPACITY));
    let read = (&mut *reader)
        .take(len as u64)
        .read_to_end(&mut payload)
        .await?;
    if read < len {
        return Err(FrameError::UnexpectedEof);
    }

    Ok(Some(Bytes::from(payload)))
}

/// Writes one already-framed buffer and flushes it.
pub async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame).await?;
    writer.flush().await
}
