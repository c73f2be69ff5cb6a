//! Command Module
//!
//! This module implements the command dispatch layer for HashKV.
//! It receives parsed request tokens, executes them against the store,
//! and returns typed replies.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Codec          │  (protocol module)
//! └────────┬────────┘
//!          │ Vec<Bytes>
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Store       │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `get key`
//! - `set key value`
//! - `del key`
//! - `keys`

pub mod handler;

// Re-export the main command handler
pub use handler::{CommandError, CommandHandler, ERR_CODE_GENERIC};
