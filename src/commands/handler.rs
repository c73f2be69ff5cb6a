//! Command Handler Module
//!
//! This module maps parsed token sequences onto store operations.
//! The first token names the command; the rest are its arguments.
//!
//! ## Supported Commands
//!
//! | Command | Arity | Reply |
//! |---|---|---|
//! | `get key` | 1 | String if found, else Nil |
//! | `set key value` | 2 | Nil |
//! | `del key` | 1 | Integer 1 if deleted, else 0 |
//! | `keys` | 0 | Array of every key |
//!
//! Command names are lowercase and matched case-sensitively.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │  execute()  │───>│  dispatch() │───>│   cmd_*()   │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │         ▲                                     │             │
//! │         │ CommandError → Reply::Err           ▼             │
//! │                                            Store            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dispatch is stateless: nothing carries over between calls.

use crate::protocol::Reply;
use crate::storage::{Store, Value};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Error code carried by every command error reply
pub const ERR_CODE_GENERIC: i32 = 1;

/// A well-formed request that cannot be executed.
///
/// These never close the connection: they are turned into an error reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The request carried zero tokens
    #[error("Empty command")]
    EmptyCommand,

    /// The first token is not a known command
    #[error("Unknown command")]
    UnknownCommand,

    /// Wrong number of arguments for a known command
    #[error("{command} requires {}", arity_phrase(.expected))]
    WrongArity {
        command: &'static str,
        expected: usize,
    },
}

fn arity_phrase(expected: &usize) -> &'static str {
    match *expected {
        0 => "no arguments",
        1 => "one argument",
        2 => "two arguments",
        _ => "more arguments",
    }
}

impl CommandError {
    /// Wire error code for this error.
    pub fn code(&self) -> i32 {
        ERR_CODE_GENERIC
    }
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::error(err.code(), err.to_string())
    }
}

type CommandResult = Result<Reply, CommandError>;

/// Executes commands against the shared store.
#[derive(Clone)]
pub struct CommandHandler {
    store: Arc<Store>,
}

impl CommandHandler {
    /// Creates a new command handler over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Returns the store this handler executes against.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Executes a command and returns the reply.
    ///
    /// Command errors are folded into `Reply::Err`; this never fails.
    pub fn execute(&self, tokens: Vec<Bytes>) -> Reply {
        match self.dispatch(tokens) {
            Ok(reply) => reply,
            Err(e) => {
                trace!(error = %e, "Command rejected");
                e.into()
            }
        }
    }

    /// Dispatches a command to its handler.
    fn dispatch(&self, tokens: Vec<Bytes>) -> CommandResult {
        let mut tokens = tokens.into_iter();
        let name = tokens.next().ok_or(CommandError::EmptyCommand)?;
        let args: Vec<Bytes> = tokens.collect();

        match &name[..] {
            b"get" => self.cmd_get(args),
            b"set" => self.cmd_set(args),
            b"del" => self.cmd_del(args),
            b"keys" => self.cmd_keys(),
            _ => Err(CommandError::UnknownCommand),
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// GET key
    fn cmd_get(&self, args: Vec<Bytes>) -> CommandResult {
        let [key] = expect_args::<1>("GET", args)?;

        Ok(match self.store.get(&key) {
            Some(Value::Str(value)) => Reply::Str(value),
            None => Reply::Nil,
        })
    }

    /// SET key value
    fn cmd_set(&self, args: Vec<Bytes>) -> CommandResult {
        let [key, value] = expect_args::<2>("SET", args)?;

        self.store.set(key, Value::Str(value));
        Ok(Reply::Nil)
    }

    /// DEL key
    fn cmd_del(&self, args: Vec<Bytes>) -> CommandResult {
        let [key] = expect_args::<1>("DEL", args)?;

        let deleted = self.store.delete(&key);
        Ok(Reply::integer(i64::from(deleted)))
    }

    /// KEYS
    ///
    /// Extra arguments are ignored.
    fn cmd_keys(&self) -> CommandResult {
        Ok(Reply::array(self.store.keys()))
    }
}

/// Checks arity and moves the arguments into a fixed-size array.
fn expect_args<const N: usize>(
    command: &'static str,
    args: Vec<Bytes>,
) -> Result<[Bytes; N], CommandError> {
    <[Bytes; N]>::try_from(args).map_err(|_| CommandError::WrongArity {
        command,
        expected: N,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_handler() -> CommandHandler {
        let store = Arc::new(Store::new());
        CommandHandler::new(store)
    }

    fn make_command(args: &[&str]) -> Vec<Bytes> {
        args.iter().map(|s| Bytes::from(s.to_string())).collect()
    }

    #[test]
    fn test_set_get() {
        let handler = create_handler();

        let response = handler.execute(make_command(&["set", "foo", "bar"]));
        assert_eq!(response, Reply::Nil);

        let response = handler.execute(make_command(&["get", "foo"]));
        assert_eq!(response, Reply::string(Bytes::from("bar")));
    }

    #[test]
    fn test_get_nonexistent() {
        let handler = create_handler();

        let response = handler.execute(make_command(&["get", "missing"]));
        assert_eq!(response, Reply::Nil);
    }

    #[test]
    fn test_del() {
        let handler = create_handler();

        handler.execute(make_command(&["set", "foo", "bar"]));

        let response = handler.execute(make_command(&["del", "foo"]));
        assert_eq!(response, Reply::integer(1));

        let response = handler.execute(make_command(&["del", "foo"]));
        assert_eq!(response, Reply::integer(0));

        let response = handler.execute(make_command(&["get", "foo"]));
        assert_eq!(response, Reply::Nil);
    }

    #[test]
    fn test_keys() {
        let handler = create_handler();

        let response = handler.execute(make_command(&["keys"]));
        assert_eq!(response, Reply::array(vec![]));

        handler.execute(make_command(&["set", "a", "1"]));
        handler.execute(make_command(&["set", "b", "2"]));
        handler.execute(make_command(&["set", "a", "3"]));

        let mut keys = match handler.execute(make_command(&["keys"])) {
            Reply::Arr(keys) => keys,
            other => panic!("expected array, got {:?}", other),
        };
        keys.sort();
        assert_eq!(keys, vec![Bytes::from("a"), Bytes::from("b")]);
    }

    #[test]
    fn test_keys_ignores_extra_arguments() {
        let handler = create_handler();
        handler.execute(make_command(&["set", "a", "1"]));

        let response = handler.execute(make_command(&["keys", "*"]));
        assert_eq!(response, Reply::array(vec![Bytes::from("a")]));
    }

    #[test]
    fn test_arity_errors() {
        let handler = create_handler();

        let cases = [
            (vec!["get"], "GET requires one argument"),
            (vec!["get", "a", "b"], "GET requires one argument"),
            (vec!["set", "a"], "SET requires two arguments"),
            (vec!["set", "a", "b", "c"], "SET requires two arguments"),
            (vec!["del"], "DEL requires one argument"),
        ];

        for (command, message) in cases {
            let response = handler.execute(make_command(&command));
            assert_eq!(response, Reply::error(1, message), "command {:?}", command);
        }

        // Nothing was written by the rejected SETs
        assert!(handler.store().is_empty());
    }

    #[test]
    fn test_empty_command() {
        let handler = create_handler();

        let response = handler.execute(vec![]);
        assert_eq!(response, Reply::error(1, "Empty command"));
    }

    #[test]
    fn test_unknown_command() {
        let handler = create_handler();

        let response = handler.execute(make_command(&["frobnicate"]));
        assert_eq!(response, Reply::error(1, "Unknown command"));
    }

    #[test]
    fn test_command_names_are_case_sensitive() {
        let handler = create_handler();

        let response = handler.execute(make_command(&["GET", "foo"]));
        assert_eq!(response, Reply::error(1, "Unknown command"));
    }

    #[test]
    fn test_binary_values() {
        let handler = create_handler();
        let value = Bytes::from_static(b"\x00\xff\r\n");

        handler.execute(vec![Bytes::from("set"), Bytes::from("bin"), value.clone()]);
        let response = handler.execute(make_command(&["get", "bin"]));
        assert_eq!(response, Reply::Str(value));
    }
}
