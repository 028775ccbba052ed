//! Command Handler Module
//!
//! This module turns request lines into storage operations and replies.
//!
//! ## Supported Commands
//!
//! - `SET key value` - Set a key, clearing any TTL
//! - `GET key` - Get a key's value
//! - `DEL key` - Delete a key
//! - `KEYS pattern` - Find keys by glob pattern
//! - `EXPIRE key seconds` - Set a TTL on an existing key
//! - `TTL key` - Get remaining TTL (`-1` no TTL, `-2` missing)
//! - `EXISTS key` - Check if a key exists
//! - `PERSIST key` - Remove a key's TTL
//! - `PING` - Test connection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │   parse()   │───>│  dispatch() │───>│  cmd_*()    │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                      StorageEngine          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The handler holds no per-connection state. Every line is one complete
//! command and always produces a reply; errors are replies too.

use crate::commands::command::{Command, CommandError};
use crate::protocol::{Reply, Request};
use crate::storage::StorageEngine;
use bytes::Bytes;
use std::sync::Arc;

type CommandResult = Result<Reply, CommandError>;

/// Executes request lines against a shared storage engine.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    /// Creates a new command handler with the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// The storage engine this handler writes to.
    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    /// Executes one request line and returns the reply.
    ///
    /// # Example
    ///
    /// ```
    /// use linekv::commands::CommandHandler;
    /// use linekv::storage::StorageEngine;
    /// use std::sync::Arc;
    ///
    /// let handler = CommandHandler::new(Arc::new(StorageEngine::new()));
    /// assert_eq!(handler.execute("SET k v").to_string(), "OK");
    /// assert_eq!(handler.execute("get k").to_string(), "v");
    /// assert_eq!(handler.execute("FOO").to_string(), "Unknown command");
    /// ```
    pub fn execute(&self, line: &str) -> Reply {
        let request = Request::parse(line);
        self.execute_request(&request)
    }

    /// Executes an already split request.
    pub fn execute_request(&self, request: &Request) -> Reply {
        self.dispatch(request).unwrap_or_else(Reply::from)
    }

    /// Resolves the command, checks arity and runs it.
    fn dispatch(&self, request: &Request) -> CommandResult {
        let cmd = Command::from_name(&request.name).ok_or(CommandError::UnknownCommand)?;

        let args = request.args.as_slice();
        if args.len() != cmd.arity() {
            return Err(CommandError::WrongArity(cmd.name()));
        }

        match cmd {
            Command::Set => self.cmd_set(args),
            Command::Get => self.cmd_get(args),
            Command::Del => self.cmd_del(args),
            Command::Keys => self.cmd_keys(args),
            Command::Expire => self.cmd_expire(args),
            Command::Ttl => self.cmd_ttl(args),
            Command::Exists => self.cmd_exists(args),
            Command::Persist => self.cmd_persist(args),
            Command::Ping => Ok(Reply::Pong),
        }
    }

    // ========================================================================
    // String Commands
    // ========================================================================

    /// SET key value
    fn cmd_set(&self, args: &[String]) -> CommandResult {
        let value = Bytes::copy_from_slice(args[1].as_bytes());
        self.storage.set(args[0].clone(), value);
        Ok(Reply::Ok)
    }

    /// GET key
    fn cmd_get(&self, args: &[String]) -> CommandResult {
        Ok(match self.storage.get(&args[0]) {
            Some(value) => Reply::Value(value),
            None => Reply::Nil,
        })
    }

    /// DEL key
    fn cmd_del(&self, args: &[String]) -> CommandResult {
        Ok(Reply::boolean(self.storage.delete(&args[0])))
    }

    // ========================================================================
    // Key Commands
    // ========================================================================

    /// KEYS pattern
    fn cmd_keys(&self, args: &[String]) -> CommandResult {
        Ok(Reply::Keys(self.storage.keys(&args[0])))
    }

    /// EXPIRE key seconds
    fn cmd_expire(&self, args: &[String]) -> CommandResult {
        let secs: i64 = args[1]
            .parse()
            .map_err(|_| CommandError::InvalidExpireTime)?;

        Ok(Reply::boolean(self.storage.expire(&args[0], secs)))
    }

    /// TTL key
    fn cmd_ttl(&self, args: &[String]) -> CommandResult {
        Ok(Reply::integer(self.storage.ttl(&args[0]).as_integer()))
    }

    /// EXISTS key
    fn cmd_exists(&self, args: &[String]) -> CommandResult {
        Ok(Reply::boolean(self.storage.exists(&args[0])))
    }

    /// PERSIST key
    fn cmd_persist(&self, args: &[String]) -> CommandResult {
        Ok(Reply::boolean(self.storage.persist(&args[0])))
    }
}
