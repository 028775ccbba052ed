//! Thread-Safe Storage Engine with Lazy Expiry
//!
//! This module implements the key space for LineKV: a sharded map from
//! string keys to [`Entry`] records, each carrying an optional absolute
//! expiry time.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Keys are spread over a fixed set of shards, each
//!    behind its own `RwLock`, so unrelated keys never contend.
//! 2. **Lazy Expiry Only**: An expired entry is removed by the first
//!    operation that observes it. There is no background sweep.
//! 3. **Injected Clock**: "Now" comes from a [`Clock`], so expiry can be
//!    tested without sleeping.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single-key operations hold one shard lock for their whole
//! read-modify-write. `keys` locks every shard in index order before it
//! scans, so it sees one consistent snapshot.

use crate::storage::clock::{Clock, SystemClock};
use crate::storage::glob::GlobPattern;
use bytes::Bytes;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Number of shards for the storage engine.
const NUM_SHARDS: usize = 64;

const MILLIS_PER_SEC: i64 = 1000;

/// A stored value with optional expiry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The actual value stored
    pub value: Bytes,
    /// Absolute expiry in milliseconds since the Unix epoch (None = never expires)
    pub expires_at: Option<i64>,
}

impl Entry {
    /// Creates a new entry without expiry.
    pub fn new(value: Bytes) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Creates a new entry that expires `ttl_secs` after `now`.
    pub fn with_ttl(value: Bytes, now: i64, ttl_secs: i64) -> Self {
        Self {
            value,
            expires_at: Some(deadline(now, ttl_secs)),
        }
    }

    /// Checks if this entry has expired as of `now`.
    #[inline]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Computes `now + ttl_secs` in milliseconds, saturating at the extremes.
fn deadline(now: i64, ttl_secs: i64) -> i64 {
    now.saturating_add(ttl_secs.saturating_mul(MILLIS_PER_SEC))
}

/// Result of a TTL lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlStatus {
    /// Whole seconds left before expiry, rounded down
    Remaining(u64),
    /// The key is live and has no expiry
    NoExpiry,
    /// The key does not exist (or just expired)
    Missing,
}

impl TtlStatus {
    /// The integer reported to clients: seconds, `-1` or `-2`.
    pub fn as_integer(self) -> i64 {
        match self {
            TtlStatus::Remaining(secs) => secs as i64,
            TtlStatus::NoExpiry => -1,
            TtlStatus::Missing => -2,
        }
    }
}

type ShardMap = HashMap<String, Entry>;

/// A single shard containing a portion of the key space.
#[derive(Debug, Default)]
struct Shard {
    data: RwLock<ShardMap>,
}

impl Shard {
    // No operation leaves an entry half-written, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, ShardMap> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ShardMap> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// The key space shared by every client connection.
///
/// Wrap it in an `Arc` and hand a clone to each connection task. All
/// operations are synchronous and thread-safe.
///
/// # Example
///
/// ```
/// use linekv::storage::{StorageEngine, TtlStatus};
/// use bytes::Bytes;
///
/// let engine = StorageEngine::new();
///
/// engine.set("name".to_string(), Bytes::from("linekv"));
/// assert_eq!(engine.get("name"), Some(Bytes::from("linekv")));
/// assert_eq!(engine.ttl("name"), TtlStatus::NoExpiry);
///
/// assert!(engine.expire("name", 60));
/// assert!(matches!(engine.ttl("name"), TtlStatus::Remaining(_)));
/// ```
pub struct StorageEngine {
    shards: Vec<Shard>,

    clock: Arc<dyn Clock>,

    /// Statistics: total number of keys (approximate)
    key_count: AtomicU64,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,

    /// Statistics: total DEL operations
    del_count: AtomicU64,

    /// Statistics: number of expired keys removed
    expired_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("shards", &self.shards.len())
            .field("key_count", &self.key_count.load(Ordering::Relaxed))
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates a storage engine driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a storage engine that reads time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Shard::default()).collect();

        Self {
            shards,
            clock,
            key_count: AtomicU64::new(0),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
        }
    }

    #[inline]
    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    #[inline]
    fn get_shard(&self, key: &str) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    #[inline]
    fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Removes `key` if it has expired. Returns `true` if it was removed.
    ///
    /// Callers must hold the write lock of the key's shard.
    fn evict_if_expired(&self, data: &mut ShardMap, key: &str, now: i64) -> bool {
        if data.get(key).is_some_and(|entry| entry.is_expired(now)) {
            data.remove(key);
            self.key_count.fetch_sub(1, Ordering::Relaxed);
            self.expired_count.fetch_add(1, Ordering::Relaxed);
            return true;
        }
        false
    }

    fn insert(&self, key: String, entry: Entry) -> bool {
        self.set_count.fetch_add(1, Ordering::Relaxed);

        let mut data = self.get_shard(&key).write();
        let is_new = !data.contains_key(&key);
        data.insert(key, entry);

        if is_new {
            self.key_count.fetch_add(1, Ordering::Relaxed);
        }

        is_new
    }

    /// Sets a key-value pair without expiry.
    ///
    /// Any previous entry is replaced, TTL included.
    ///
    /// Returns `true` if no entry was stored under the key before.
    pub fn set(&self, key: String, value: Bytes) -> bool {
        self.insert(key, Entry::new(value))
    }

    /// Sets a key-value pair that expires `ttl_secs` seconds from now.
    ///
    /// Returns `true` if no entry was stored under the key before.
    pub fn set_with_ttl(&self, key: String, value: Bytes, ttl_secs: i64) -> bool {
        let entry = Entry::with_ttl(value, self.now(), ttl_secs);
        self.insert(key, entry)
    }

    /// Gets the value for a key.
    ///
    /// Returns `None` if the key doesn't exist or has expired. An expired
    /// entry is removed here.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let now = self.now();
        let shard = self.get_shard(key);

        // Fast path under the read lock
        {
            let data = shard.read();
            match data.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: take the write lock and re-check, another writer may have
        // replaced the entry in between.
        let mut data = shard.write();
        if self.evict_if_expired(&mut data, key, now) {
            return None;
        }
        data.get(key).map(|entry| entry.value.clone())
    }

    /// Deletes a key.
    ///
    /// Returns `true` only if a live entry was removed. An expired entry is
    /// removed too but reported as absent.
    pub fn delete(&self, key: &str) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);

        let now = self.now();
        let mut data = self.get_shard(key).write();

        if self.evict_if_expired(&mut data, key, now) {
            return false;
        }

        if data.remove(key).is_some() {
            self.key_count.fetch_sub(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Checks if a key exists and is not expired.
    pub fn exists(&self, key: &str) -> bool {
        let now = self.now();
        let mut data = self.get_shard(key).write();

        if self.evict_if_expired(&mut data, key, now) {
            return false;
        }
        data.contains_key(key)
    }

    /// Sets an expiry `ttl_secs` seconds from now on an existing key.
    ///
    /// Zero or negative TTLs are accepted; the key then expires on its next
    /// access.
    ///
    /// Returns `true` if the expiry was set, `false` if the key doesn't exist.
    pub fn expire(&self, key: &str, ttl_secs: i64) -> bool {
        let now = self.now();
        let mut data = self.get_shard(key).write();

        if self.evict_if_expired(&mut data, key, now) {
            return false;
        }

        match data.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(deadline(now, ttl_secs));
                true
            }
            None => false,
        }
    }

    /// Removes the expiry from a key.
    ///
    /// Returns `true` only if the key exists and had an expiry.
    pub fn persist(&self, key: &str) -> bool {
        let now = self.now();
        let mut data = self.get_shard(key).write();

        if self.evict_if_expired(&mut data, key, now) {
            return false;
        }

        data.get_mut(key)
            .is_some_and(|entry| entry.expires_at.take().is_some())
    }

    /// Gets the remaining TTL for a key, rounded down to whole seconds.
    pub fn ttl(&self, key: &str) -> TtlStatus {
        let now = self.now();
        let mut data = self.get_shard(key).write();

        if self.evict_if_expired(&mut data, key, now) {
            return TtlStatus::Missing;
        }

        match data.get(key) {
            None => TtlStatus::Missing,
            Some(Entry {
                expires_at: None, ..
            }) => TtlStatus::NoExpiry,
            Some(Entry {
                expires_at: Some(exp),
                ..
            }) => {
                // Not expired, so exp > now
                TtlStatus::Remaining(((exp - now) / MILLIS_PER_SEC) as u64)
            }
        }
    }

    /// Returns all live keys matching a glob pattern, sorted lexicographically.
    ///
    /// Expired entries met during the scan are removed.
    ///
    /// **Warning**: This operation locks and scans every shard.
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        let pattern = GlobPattern::new(pattern);
        let now = self.now();

        // Lock every shard up front, in index order, for a consistent snapshot
        let mut guards: Vec<_> = self.shards.iter().map(Shard::write).collect();

        let mut result = Vec::new();
        let mut expired = 0u64;

        for data in guards.iter_mut() {
            data.retain(|key, entry| {
                if entry.is_expired(now) {
                    expired += 1;
                    return false;
                }
                if pattern.matches(key) {
                    result.push(key.clone());
                }
                true
            });
        }

        drop(guards);

        if expired > 0 {
            self.key_count.fetch_sub(expired, Ordering::Relaxed);
            self.expired_count.fetch_add(expired, Ordering::Relaxed);
        }

        result.sort_unstable();
        result
    }

    /// Returns the approximate number of keys, including expired entries not
    /// yet removed.
    pub fn len(&self) -> u64 {
        self.key_count.load(Ordering::Relaxed)
    }

    /// Returns true if the database is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns database statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.key_count.load(Ordering::Relaxed),
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
        }
    }
}

/// Database statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of keys currently stored
    pub keys: u64,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
    /// Total DEL operations
    pub del_ops: u64,
    /// Total expired keys removed
    pub expired: u64,
}
