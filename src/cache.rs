/// Time-boxed cache for the last good site collection.
///
/// ## Architecture: one slot per data kind
///
/// **Store (injected):**
/// - `CacheStore` is a plain key → blob interface. `FileStore` keeps one
///   JSON file per key; `MemoryStore` backs tests and counts its reads and
///   writes.
/// - No locks or transactions around read-then-write. Two refreshes racing
///   each write a complete, independently valid snapshot; last writer wins.
///
/// **Entry:**
/// - Serialized as `{ "data": [...sites], "timestamp": "<RFC 3339>" }`.
/// - An entry past its TTL is *stale*, never deleted. Staleness only demotes
///   it from "answer immediately" to "last-resort fallback".
/// - Any read or decode failure is treated exactly like a miss.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::model::Site;

/// Slot name for the site collection.
pub const SITES_CACHE_KEY: &str = "aquarisk_sites";

pub const DEFAULT_TTL_MINUTES: i64 = 60;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("cache entry could not be encoded or decoded: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("cache store lock poisoned")]
    Poisoned,
}

// ---------------------------------------------------------------------------
// Store interface
// ---------------------------------------------------------------------------

/// Key → serialized blob storage.
pub trait CacheStore: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written.
    fn read(&self, key: &str) -> Result<Option<String>, CacheError>;
    /// Replaces the blob for `key`.
    fn write(&self, key: &str, blob: &str) -> Result<(), CacheError>;
}

/// In-process store with access counters.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let slots = self.slots.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut slots = self.slots.lock().map_err(|_| CacheError::Poisoned)?;
        slots.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per slot under `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl CacheStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a temporary sibling and renames it into place, so a reader
    /// never sees a half-written blob.
    fn write(&self, key: &str, blob: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let staging = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&staging, blob)?;
        fs::rename(&staging, &target)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// The cached site collection and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(rename = "data")]
    pub sites: Vec<Site>,
    #[serde(rename = "timestamp")]
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(sites: Vec<Site>, fetched_at: DateTime<Utc>) -> Self {
        Self { sites, fetched_at }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// `0 <= now - fetched_at < ttl`. An entry stamped in the future (clock
    /// skew, a copied cache file) is never fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = self.age(now);
        age >= Duration::zero() && age < ttl
    }
}

// ---------------------------------------------------------------------------
// Typed access to the site slot
// ---------------------------------------------------------------------------

/// Site slot on top of an injected store.
#[derive(Clone)]
pub struct SiteCache {
    store: Arc<dyn CacheStore>,
    key: String,
    ttl: Duration,
}

impl SiteCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            key: SITES_CACHE_KEY.to_string(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Reads the entry regardless of age. Read failures and corrupt blobs
    /// are logged and reported as `None`.
    pub fn load(&self) -> Option<CacheEntry> {
        let blob = match self.store.read(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "cache read failed; treating as miss");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&blob) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key = %self.key, error = %e, "cache entry unreadable; treating as miss");
                None
            }
        }
    }

    /// Overwrites the slot with `entry`.
    pub fn save(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let blob = serde_json::to_string(entry)?;
        self.store.write(&self.key, &blob)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
