//! Chained Hash Table Store
//!
//! This module implements the key-value store behind HashKV: a fixed-size
//! hash table with separate chaining, guarded by a single reader-writer lock.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Store (one RwLock over everything)           │
//! │                                                              │
//! │  bucket 0  ──> [entry] -> [entry]                            │
//! │  bucket 1  ──> (empty)                                       │
//! │  bucket 2  ──> [entry]                                       │
//! │  ...                                                         │
//! │  bucket 15 ──> [entry] -> [entry] -> [entry]                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each bucket is a `Vec<Entry>` standing in for a linked chain: entries are
//! appended at the tail and removed in place, so chain order is insertion order.
//!
//! ## Concurrency Model
//!
//! `set` and `delete` take the write lock for the whole table. `get` and
//! `list_all` take the read lock, so reads run concurrently with each other
//! but never with a write.
//!
//! The bucket count never changes. Chains grow with load and there is no
//! rehashing.

use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Number of buckets in the table. Fixed for the lifetime of a store.
pub const BUCKET_COUNT: usize = 16;

/// A value held by the store.
///
/// The protocol only ever stores strings, so this is a closed set with a
/// single variant. The protocol layer is the only place that interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A binary-safe string
    Str(Bytes),
}

impl Value {
    /// Returns the raw bytes of this value.
    pub fn as_bytes(&self) -> &Bytes {
        match self {
            Value::Str(b) => b,
        }
    }

    /// Consumes the value and returns its bytes.
    pub fn into_bytes(self) -> Bytes {
        match self {
            Value::Str(b) => b,
        }
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Str(b)
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::Str(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Bytes::from(s))
    }
}

/// A single key-value pair in a bucket chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Bytes,
    pub value: Value,
}

/// Snapshot of store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub keys: u64,
    pub get_ops: u64,
    pub set_ops: u64,
    pub del_ops: u64,
}

/// Polynomial string hash: `hash = 31 * hash + byte` over every byte.
///
/// Arithmetic wraps on overflow in two's complement, so long keys produce
/// negative values. Use [`bucket_index`] to map the result into the table.
#[inline]
pub fn hash_key(key: &[u8]) -> i64 {
    key.iter()
        .fold(0i64, |hash, &b| hash.wrapping_mul(31).wrapping_add(i64::from(b)))
}

/// Maps a key to its bucket. Always in `0..BUCKET_COUNT`.
#[inline]
pub fn bucket_index(key: &[u8]) -> usize {
    hash_key(key).rem_euclid(BUCKET_COUNT as i64) as usize
}

/// The lock-protected part of the store.
#[derive(Debug)]
struct Table {
    buckets: Vec<Vec<Entry>>,
    /// Live entry count, maintained by set/delete
    size: usize,
}

impl Table {
    fn new() -> Self {
        Self {
            buckets: (0..BUCKET_COUNT).map(|_| Vec::new()).collect(),
            size: 0,
        }
    }

    fn set(&mut self, key: Bytes, value: Value) {
        let chain = &mut self.buckets[bucket_index(&key)];

        // Every node is checked before appending, so a key never appears twice.
        if let Some(entry) = chain.iter_mut().find(|e| e.key == key) {
            entry.value = value;
            return;
        }

        chain.push(Entry { key, value });
        self.size += 1;
    }

    fn get(&self, key: &[u8]) -> Option<&Value> {
        self.buckets[bucket_index(key)]
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    fn delete(&mut self, key: &[u8]) -> bool {
        let chain = &mut self.buckets[bucket_index(key)];

        match chain.iter().position(|e| e.key == key) {
            Some(pos) => {
                // `remove` keeps the rest of the chain in order
                chain.remove(pos);
                self.size -= 1;
                true
            }
            None => false,
        }
    }
}

/// The shared key-value store.
///
/// Created once at startup, wrapped in an `Arc`, and shared by every
/// connection task.
///
/// # Example
///
/// ```
/// use hashkv::storage::{Store, Value};
/// use bytes::Bytes;
///
/// let store = Store::new();
///
/// store.set(Bytes::from("name"), Value::from("Ariz"));
/// assert_eq!(store.get(b"name"), Some(Value::from("Ariz")));
///
/// assert!(store.delete(b"name"));
/// assert_eq!(store.get(b"name"), None);
/// ```
pub struct Store {
    table: RwLock<Table>,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,

    /// Statistics: total DEL operations
    del_count: AtomicU64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("buckets", &BUCKET_COUNT)
            .field("len", &self.len())
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::new()),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
        }
    }

    // A panic while holding the lock cannot leave the table half-updated:
    // every mutation is a single push, remove, or assignment.
    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or overwrites a key.
    ///
    /// An existing key keeps its position in the chain and the size is
    /// unchanged. A new key is appended to its bucket's chain.
    pub fn set(&self, key: Bytes, value: Value) {
        self.set_count.fetch_add(1, Ordering::Relaxed);
        self.write().set(key, value);
    }

    /// Looks up a key.
    pub fn get(&self, key: &[u8]) -> Option<Value> {
        self.get_count.fetch_add(1, Ordering::Relaxed);
        self.read().get(key).cloned()
    }

    /// Removes a key.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key was present, `false` otherwise.
    pub fn delete(&self, key: &[u8]) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);
        self.write().delete(key)
    }

    /// Returns a snapshot of every live entry.
    ///
    /// Entries come out in bucket order, then chain order within a bucket.
    /// The order depends on the hash layout and is not meaningful to callers.
    /// Each call re-walks the current table.
    pub fn list_all(&self) -> Vec<Entry> {
        let table = self.read();
        let mut result = Vec::with_capacity(table.size);

        for chain in &table.buckets {
            result.extend(chain.iter().cloned());
        }

        result
    }

    /// Returns every key currently present, in [`list_all`](Self::list_all) order.
    pub fn keys(&self) -> Vec<Bytes> {
        let table = self.read();
        table
            .buckets
            .iter()
            .flat_map(|chain| chain.iter().map(|e| e.key.clone()))
            .collect()
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.read().size
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.len() as u64,
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
        }
    }

    /// Returns the length of each bucket chain, in bucket order.
    pub fn chain_lengths(&self) -> [usize; BUCKET_COUNT] {
        let table = self.read();
        let mut lengths = [0; BUCKET_COUNT];
        for (len, chain) in lengths.iter_mut().zip(&table.buckets) {
            *len = chain.len();
        }
        lengths
    }
}
