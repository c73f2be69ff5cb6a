//! Reply Types
//!
//! This module defines the typed results the server sends back and their
//! wire encoding.
//!
//! ## Protocol Format
//!
//! Every reply payload starts with a one-byte type tag:
//! - `0` Nil: no further content
//! - `1` Error: `i32` code, `u32` message length, message bytes
//! - `2` String: `u32` length, bytes
//! - `3` Integer: `i64`
//! - `4` Array: `u32` count, then `count` × (`u32` length, bytes)
//!
//! All integers are big-endian. On the wire the payload is preceded by a
//! `u32` length prefix (see [`Reply::to_frame`]).
//!
//! ## Examples
//!
//! Nil: `00`
//! Integer 1: `03 00 00 00 00 00 00 00 01`
//! String "bar": `02 00 00 00 03 62 61 72`

use bytes::{BufMut, Bytes};
use std::fmt;

/// Size of the outer length prefix on every frame
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Reply type tags
pub mod tag {
    pub const NIL: u8 = 0;
    pub const ERR: u8 = 1;
    pub const STR: u8 = 2;
    pub const INT: u8 = 3;
    pub const ARR: u8 = 4;
}

/// Represents a reply sent from the server to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// No value, or success with nothing to return
    Nil,

    /// A command-level error. The connection stays usable.
    Err { code: i32, message: String },

    /// A binary-safe string
    Str(Bytes),

    /// A 64-bit signed integer
    Int(i64),

    /// A flat array of strings. Entries carry no per-entry tag.
    Arr(Vec<Bytes>),
}

impl Reply {
    /// Creates an error reply.
    ///
    /// # Example
    /// ```
    /// use hashkv::protocol::Reply;
    /// let err = Reply::error(1, "Unknown command");
    /// assert!(err.is_error());
    /// ```
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Reply::Err {
            code,
            message: message.into(),
        }
    }

    /// Creates a string reply.
    pub fn string(data: impl Into<Bytes>) -> Self {
        Reply::Str(data.into())
    }

    /// Creates an integer reply.
    pub fn integer(n: i64) -> Self {
        Reply::Int(n)
    }

    /// Creates an array reply.
    pub fn array(values: Vec<Bytes>) -> Self {
        Reply::Arr(values)
    }

    /// Returns the type tag written for this reply.
    pub fn tag(&self) -> u8 {
        match self {
            Reply::Nil => tag::NIL,
            Reply::Err { .. } => tag::ERR,
            Reply::Str(_) => tag::STR,
            Reply::Int(_) => tag::INT,
            Reply::Arr(_) => tag::ARR,
        }
    }

    /// Serializes the reply payload (tag + content, without the length prefix).
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply payload into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        buf.put_u8(self.tag());
        match self {
            Reply::Nil => {}
            Reply::Err { code, message } => {
                buf.put_i32(*code);
                put_string(buf, message.as_bytes());
            }
            Reply::Str(data) => put_string(buf, data),
            Reply::Int(n) => buf.put_i64(*n),
            Reply::Arr(values) => {
                buf.put_u32(wire_len(values.len()));
                for value in values {
                    put_string(buf, value);
                }
            }
        }
    }

    /// Serializes the reply as a complete frame: length prefix, then payload.
    pub fn to_frame(&self) -> Vec<u8> {
        let len = self.encoded_len();
        let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + len);
        buf.put_u32(wire_len(len));
        self.serialize_into(&mut buf);
        buf
    }

    /// Length of the serialized payload in bytes.
    pub fn encoded_len(&self) -> usize {
        1 + match self {
            Reply::Nil => 0,
            Reply::Err { message, .. } => 4 + 4 + message.len(),
            Reply::Str(data) => 4 + data.len(),
            Reply::Int(_) => 8,
            Reply::Arr(values) => 4 + values.iter().map(|v| 4 + v.len()).sum::<usize>(),
        }
    }

    /// Returns true if this reply is Nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    /// Returns true if this reply is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Err { .. })
    }

    /// Attempts to extract the inner bytes from a string reply.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Reply::Str(b) => Some(b),
            _ => None,
        }
    }

    /// Attempts to extract the inner integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// Converts a length or count to its 4-byte wire field.
///
/// Values past `u32::MAX` cannot be represented; they saturate in release
/// builds and trip an assertion in debug builds.
fn wire_len(n: usize) -> u32 {
    debug_assert!(
        u32::try_from(n).is_ok(),
        "length {} does not fit the 4-byte wire field",
        n
    );
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn put_string(buf: &mut Vec<u8>, data: &[u8]) {
    buf.put_u32(wire_len(data.len()));
    buf.put_slice(data);
}

fn fmt_bytes(f: &mut fmt::Formatter<'_>, data: &[u8]) -> fmt::Result {
    match std::str::from_utf8(data) {
        Ok(s) => write!(f, "\"{}\"", s),
        Err(_) => write!(f, "(binary data, {} bytes)", data.len()),
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Nil => write!(f, "(nil)"),
            Reply::Err { code, message } => write!(f, "(error {}) {}", code, message),
            Reply::Str(data) => fmt_bytes(f, data),
            Reply::Int(n) => write!(f, "(integer) {}", n),
            Reply::Arr(values) => {
                if values.is_empty() {
                    return write!(f, "(empty array)");
                }
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) ", i + 1)?;
                    fmt_bytes(f, v)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_serialize() {
        assert_eq!(Reply::Nil.serialize(), vec![0]);
        assert_eq!(Reply::Nil.to_frame(), vec![0, 0, 0, 1, 0]);
    }

    #[test]
    fn test_error_serialize() {
        let value = Reply::error(1, "Unknown command");
        let mut expected = vec![1, 0, 0, 0, 1, 0, 0, 0, 15];
        expected.extend_from_slice(b"Unknown command");
        assert_eq!(value.serialize(), expected);
    }

    #[test]
    fn test_negative_error_code() {
        let value = Reply::error(-2, "");
        assert_eq!(value.serialize(), vec![1, 0xff, 0xff, 0xff, 0xfe, 0, 0, 0, 0]);
    }

    #[test]
    fn test_string_serialize() {
        let value = Reply::string(Bytes::from("bar"));
        assert_eq!(value.serialize(), vec![2, 0, 0, 0, 3, b'b', b'a', b'r']);
    }

    #[test]
    fn test_integer_serialize() {
        assert_eq!(Reply::integer(1).serialize(), vec![3, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(
            Reply::integer(-1).serialize(),
            vec![3, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn test_array_serialize() {
        let value = Reply::array(vec![Bytes::from("a"), Bytes::from("bc")]);
        assert_eq!(
            value.serialize(),
            vec![4, 0, 0, 0, 2, 0, 0, 0, 1, b'a', 0, 0, 0, 2, b'b', b'c']
        );
        assert_eq!(Reply::array(vec![]).serialize(), vec![4, 0, 0, 0, 0]);
    }

    #[test]
    fn test_frame_length_prefix() {
        let value = Reply::string(Bytes::from("hello"));
        let frame = value.to_frame();
        assert_eq!(&frame[..4], &[0, 0, 0, 10]);
        assert_eq!(&frame[4..], &value.serialize()[..]);
        assert_eq!(value.encoded_len(), 10);
    }

    #[test]
    fn test_display() {
        assert_eq!(Reply::Nil.to_string(), "(nil)");
        assert_eq!(Reply::integer(1).to_string(), "(integer) 1");
        assert_eq!(Reply::string(Bytes::from("bar")).to_string(), "\"bar\"");
        assert_eq!(
            Reply::error(1, "Unknown command").to_string(),
            "(error 1) Unknown command"
        );
        assert_eq!(
            Reply::array(vec![Bytes::from("a"), Bytes::from("b")]).to_string(),
            "1) \"a\"\n2) \"b\""
        );
    }

    #[test]
    fn test_wire_len_in_range() {
        assert_eq!(wire_len(0), 0);
        assert_eq!(wire_len(u32::MAX as usize), u32::MAX);
    }

    #[test]
    #[cfg(all(debug_assertions, target_pointer_width = "64"))]
    #[should_panic(expected = "does not fit the 4-byte wire field")]
    fn test_wire_len_overflow_asserts() {
        wire_len(u32::MAX as usize + 1);
    }

    #[test]
    #[cfg(all(not(debug_assertions), target_pointer_width = "64"))]
    fn test_wire_len_overflow_saturates() {
        assert_eq!(wire_len(u32::MAX as usize + 1), u32::MAX);
    }
}
