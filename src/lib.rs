//! # LineKV - An In-Memory Key-Value Cache
//!
//! LineKV is a small, single-node key-value cache written in Rust. Clients
//! talk to it over a line-oriented text protocol with a Redis-style command
//! set, and keys can carry a time-to-live that is enforced lazily.
//!
//! ## Features
//!
//! - **Plain Text Protocol**: One command per line, one reply per line block
//! - **Sharded Storage**: RwLock-protected shards for concurrent access
//! - **Lazy TTL**: Expired keys are removed by the first command that touches them
//! - **Testable Time**: Expiry reads an injected clock
//! - **Async I/O**: Built on Tokio, one task per connection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              LineKV                                     │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘                  │
//! │                                               │                         │
//! │                                               ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐   │
//! │  │   Line      │    │              StorageEngine                   │   │
//! │  │   Parser    │    │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │   │
//! │  │             │    │  │Shard 0 │ │Shard 1 │ │Shard 2 │ │...N    │ │   │
//! │  └─────────────┘    │  │RwLock  │ │RwLock  │ │RwLock  │ │shards  │ │   │
//! │                     │  └────────┘ └────────┘ └────────┘ └────────┘ │   │
//! │                     └──────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use linekv::commands::CommandHandler;
//! use linekv::connection::{handle_connection, ConnectionStats};
//! use linekv::protocol::DEFAULT_MAX_LINE;
//! use linekv::storage::StorageEngine;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = Arc::new(StorageEngine::new());
//!     let stats = Arc::new(ConnectionStats::new());
//!     let listener = TcpListener::bind("127.0.0.1:6379").await.unwrap();
//!
//!     loop {
//!         let (stream, addr) = listener.accept().await.unwrap();
//!         let handler = CommandHandler::new(Arc::clone(&storage));
//!         let stats = Arc::clone(&stats);
//!
//!         tokio::spawn(handle_connection(stream, addr, handler, stats, DEFAULT_MAX_LINE));
//!     }
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `SET key value`
//! - `GET key`
//! - `DEL key`
//! - `KEYS pattern`
//! - `EXPIRE key seconds`
//! - `TTL key`
//! - `EXISTS key`
//! - `PERSIST key`
//! - `PING`
//!
//! Arguments are separated by whitespace and cannot contain it; there is no
//! quoting.
//!
//! ## Module Overview
//!
//! - [`protocol`]: Line framing, request splitting and reply formatting
//! - [`storage`]: Thread-safe storage engine with lazy TTL
//! - [`commands`]: Command table and dispatcher
//! - [`connection`]: Client connection management
//! - [`config`]: Command-line configuration

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{CommandError, CommandHandler};
pub use config::{CliAction, ConfigError, ServerConfig};
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{LineParser, ParseError, Reply, Request};
pub use storage::{Clock, ManualClock, StorageEngine, SystemClock, TtlStatus};

/// The default port LineKV listens on
pub const DEFAULT_PORT: u16 = 6379;

/// The default host LineKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of LineKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
