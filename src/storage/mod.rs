//! Storage Engine Module
//!
//! This module provides the key space for LineKV: a thread-safe, sharded
//! key-value store with lazily enforced TTLs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...64    │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │ now_millis()
//!              ┌─────────────┴─────────────┐
//!              │  Clock (System / Manual)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Sharded Storage**: 64 independent shards reduce lock contention
//! - **TTL Support**: Keys can carry an absolute expiry time
//! - **Lazy Expiry**: Expired keys are removed by the first operation that sees them
//! - **Glob KEYS**: `*`, `?` and `[...]` patterns, results sorted
//!
//! ## Example
//!
//! ```
//! use linekv::storage::{ManualClock, StorageEngine, TtlStatus};
//! use bytes::Bytes;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let engine = StorageEngine::with_clock(clock.clone());
//!
//! engine.set("session".to_string(), Bytes::from("token123"));
//! engine.expire("session", 10);
//! assert_eq!(engine.ttl("session"), TtlStatus::Remaining(10));
//!
//! clock.advance(Duration::from_secs(10));
//! assert_eq!(engine.get("session"), None);
//! ```

pub mod clock;
pub mod engine;
pub mod glob;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Entry, StorageEngine, StorageStats, TtlStatus};
pub use glob::GlobPattern;
