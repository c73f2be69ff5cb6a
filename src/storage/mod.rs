//! Storage Module
//!
//! This module provides the key-value store for HashKV: a fixed-size,
//! separately-chained hash table shared by every connection.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │                   RwLock<Table> (global)                    │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │Bucket 0 │ │Bucket 1 │ │Bucket 2 │ │...16    │           │
//! │  │ chain   │ │ chain   │ │ chain   │ │ buckets │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Deterministic hashing**: `31 * hash + byte` polynomial, wrapping on overflow
//! - **Separate chaining**: at most one entry per key across the whole table
//! - **RwLock**: concurrent readers, exclusive writers
//!
//! ## Example
//!
//! ```
//! use hashkv::storage::{Store, Value};
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! let store = Arc::new(Store::new());
//!
//! store.set(Bytes::from("name"), Value::from("Ariz"));
//! assert_eq!(store.get(b"name"), Some(Value::from("Ariz")));
//! assert_eq!(store.keys(), vec![Bytes::from("name")]);
//! ```

pub mod store;

// Re-export commonly used types
pub use store::{bucket_index, hash_key, Entry, Store, StoreStats, Value, BUCKET_COUNT};
