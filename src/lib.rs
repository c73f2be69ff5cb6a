//! # HashKV - A Small In-Memory Key-Value Store
//!
//! HashKV is an in-memory key-value store served over a custom
//! length-prefixed binary protocol on TCP. It pairs a concurrent chained
//! hash table with a stateless request/reply protocol layer.
//!
//! ## Features
//!
//! - **Binary protocol**: every request and reply is a length-prefixed frame
//! - **Chained hash table**: 16 fixed buckets, one entry per key
//! - **Reader-writer lock**: concurrent reads, exclusive writes
//! - **Async I/O**: Built on Tokio, one task per connection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              HashKV                                     │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (serve)     │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │  ┌──────────────────────────────┐  ┌──────────────────────────────┐     │
//! │  │          Codec               │  │            Store             │     │
//! │  │  frames ⇄ tokens / replies   │  │   RwLock<[16 bucket chains]> │     │
//! │  └──────────────────────────────┘  └──────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use hashkv::{serve, Store};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let store = Arc::new(Store::new());
//!     let listener = TcpListener::bind("127.0.0.1:6379").await?;
//!     serve(listener, store).await
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `get key` → String or Nil
//! - `set key value` → Nil
//! - `del key` → Integer (1 deleted, 0 absent)
//! - `keys` → Array of keys
//!
//! ## Module Overview
//!
//! - [`storage`]: The chained hash table store
//! - [`protocol`]: Frame codec, reply types, async frame I/O
//! - [`commands`]: Command dispatch
//! - [`connection`]: Per-client connection loop
//! - [`server`]: Accept loop
//! - [`client`]: Protocol client
//! - [`config`]: Command-line configuration for the binaries

pub mod client;
pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use client::{Client, ClientError};
pub use commands::{CommandError, CommandHandler};
pub use config::Config;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{FrameError, Reply};
pub use server::{serve, serve_with_stats};
pub use storage::{Store, Value};

/// The default port HashKV listens on
pub const DEFAULT_PORT: u16 = 6379;

/// The default host HashKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of HashKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
