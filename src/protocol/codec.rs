//! Request/Reply Codec
//!
//! Pure functions that turn request payloads into tokens and reply payloads
//! back into [`Reply`] values.
//!
//! ## Request Format
//!
//! ```text
//! ┌──────────┬───────────┬──────────────────┬─────┬──────────────────┐
//! │ Len (4)  │ Count (1) │ Len (4) + token  │ ... │ Len (4) + token  │
//! └──────────┴───────────┴──────────────────┴─────┴──────────────────┘
//!             └──────────────────── payload ───────────────────────────┘
//! ```
//!
//! Tokens are sliced out of the payload with `Bytes::split_to`, so parsing
//! never copies token data.

use crate::protocol::types::{tag, Reply, LENGTH_PREFIX_SIZE};
use bytes::{Buf, BufMut, Bytes};
use thiserror::Error;

/// Maximum size of a single frame payload (512 MiB)
pub const MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

/// Maximum number of tokens a request can carry (one-byte count)
pub const MAX_TOKENS: usize = u8::MAX as usize;

/// Errors raised while framing or parsing bytes off the wire.
///
/// A framing error means the byte stream can no longer be trusted to be
/// self-delimiting. The connection that produced it is dropped.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The request payload has no bytes at all
    #[error("empty request")]
    EmptyPayload,

    /// A length prefix or declared length runs past the end of the payload
    #[error("truncated frame: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// The declared frame length exceeds the limit
    #[error("frame too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },

    /// More tokens than the one-byte count can express
    #[error("too many tokens: {0} (max: 255)")]
    TooManyTokens(usize),

    /// Unknown reply type tag
    #[error("unknown reply tag: {0:#04x}")]
    UnknownTag(u8),

    /// The stream ended in the middle of a frame
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// I/O error while reading a frame
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for codec operations.
pub type FrameResult<T> = Result<T, FrameError>;

#[inline]
fn ensure(buf: &impl Buf, needed: usize) -> FrameResult<()> {
    let available = buf.remaining();
    if available < needed {
        return Err(FrameError::Truncated { needed, available });
    }
    Ok(())
}

/// Parses a request payload into its token sequence.
///
/// Token order is preserved exactly. Bytes after the last declared token
/// are ignored.
///
/// # Example
///
/// ```
/// use hashkv::protocol::{encode_request, parse_request};
/// use bytes::Bytes;
///
/// let frame = encode_request(&["set", "a", "1"]).unwrap();
/// let tokens = parse_request(Bytes::from(frame).slice(4..)).unwrap();
/// assert_eq!(tokens, vec![Bytes::from("set"), Bytes::from("a"), Bytes::from("1")]);
/// ```
pub fn parse_request(mut payload: Bytes) -> FrameResult<Vec<Bytes>> {
    if payload.is_empty() {
        return Err(FrameError::EmptyPayload);
    }

    let count = payload.get_u8() as usize;
    let mut tokens = Vec::with_capacity(count);

    for _ in 0..count {
        ensure(&payload, 4)?;
        let len = payload.get_u32() as usize;
        ensure(&payload, len)?;
        tokens.push(payload.split_to(len));
    }

    Ok(tokens)
}

/// Encodes a token sequence as a complete request frame (length prefix included).
pub fn encode_request<T: AsRef<[u8]>>(tokens: &[T]) -> FrameResult<Vec<u8>> {
    if tokens.len() > MAX_TOKENS {
        return Err(FrameError::TooManyTokens(tokens.len()));
    }

    let payload_len = 1 + tokens
        .iter()
        .map(|t| 4 + t.as_ref().len())
        .sum::<usize>();
    if payload_len > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge {
            size: payload_len,
            max: MAX_FRAME_SIZE,
        });
    }

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload_len);
    buf.put_u32(payload_len as u32);
    buf.put_u8(tokens.len() as u8);
    for token in tokens {
        let token = token.as_ref();
        buf.put_u32(token.len() as u32);
        buf.put_slice(token);
    }

    Ok(buf)
}

fn take_string(buf: &mut Bytes) -> FrameResult<Bytes> {
    ensure(&*buf, 4)?;
    let len = buf.get_u32() as usize;
    ensure(&*buf, len)?;
    Ok(buf.split_to(len))
}

/// Decodes a reply payload (without its length prefix).
///
/// Used on the client side of the protocol.
pub fn decode_reply(mut payload: Bytes) -> FrameResult<Reply> {
    ensure(&payload, 1)?;

    match payload.get_u8() {
        tag::NIL => Ok(Reply::Nil),
        tag::ERR => {
            ensure(&payload, 4)?;
            let code = payload.get_i32();
            let message = take_string(&mut payload)?;
            Ok(Reply::Err {
                code,
                message: String::from_utf8_lossy(&message).into_owned(),
            })
        }
        tag::STR => Ok(Reply::Str(take_string(&mut payload)?)),
        tag::INT => {
            ensure(&payload, 8)?;
            Ok(Reply::Int(payload.get_i64()))
        }
        tag::ARR => {
            ensure(&payload, 4)?;
            let count = payload.get_u32() as usize;
            // Each entry needs at least its length prefix
            ensure(&payload, count.saturating_mul(4))?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(take_string(&mut payload)?);
            }
            Ok(Reply::Arr(values))
        }
        other => Err(FrameError::UnknownTag(other)),
    }
}
