//! Wire Protocol Implementation
//!
//! This module implements HashKV's length-prefixed binary protocol.
//!
//! ## Overview
//!
//! Every request and every reply is a frame: a 4-byte big-endian length
//! followed by that many payload bytes. A request payload is a one-byte
//! token count followed by length-prefixed tokens. A reply payload is a
//! one-byte type tag followed by tag-specific content.
//!
//! ## Modules
//!
//! - `types`: Defines the `Reply` enum and its serialization
//! - `codec`: Request parsing/encoding and reply decoding
//! - `frame`: Async reading and writing of single frames
//!
//! ## Example
//!
//! ```
//! use hashkv::protocol::{encode_request, parse_request, Reply};
//! use bytes::Bytes;
//!
//! // Client side: build a request frame
//! let frame = encode_request(&["get", "name"]).unwrap();
//!
//! // Server side: strip the length prefix and parse the tokens
//! let tokens = parse_request(Bytes::from(frame).slice(4..)).unwrap();
//! assert_eq!(tokens[0], Bytes::from("get"));
//!
//! // Creating replies
//! let reply = Reply::string(Bytes::from("Ariz"));
//! let bytes = reply.to_frame();
//! ```

pub mod codec;
pub mod frame;
pub mod types;

// Re-export commonly used types for convenience
pub use codec::{
    decode_reply, encode_request, parse_request, FrameError, FrameResult, MAX_FRAME_SIZE,
    MAX_TOKENS,
};
pub use frame::{read_frame, write_frame};
pub use types::{Reply, LENGTH_PREFIX_SIZE};
