//! Command Handler Module
//!
//! This module implements the command processing layer for LineKV.
//! It receives request lines, validates them against the command table,
//! executes them against the storage engine and returns replies.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Line Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Lookup       │
//! │  - Arity check  │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ StorageEngine   │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `SET`, `GET`, `DEL`, `EXISTS`
//! - `EXPIRE`, `TTL`, `PERSIST`, `KEYS`
//! - `PING`

pub mod command;
pub mod handler;

// Re-export the main command handler
pub use command::{Command, CommandError};
pub use handler::CommandHandler;
