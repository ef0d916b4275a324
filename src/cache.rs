// SPDX-License-Identifier: Apache-2.0

//! Time-bounded cache for spender contract-source lookups
//!
//! Contract verification metadata changes rarely, so lookups are cached
//! for 24 hours and persisted, letting repeated scans in one session (or
//! across restarts) skip the explorer entirely. The storage backend is
//! injected: a JSON blob on disk in production, an in-memory blob in
//! tests. The cache object itself is owned by whoever builds the scanner;
//! there is no global instance.
//!
//! Keys are `"<chainId>-<lowercased address>"`, so concurrent scans on
//! different chains can share one cache without collisions. Eviction is
//! lazy: an expired entry is dropped when it is next read.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, ChainId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::constants::CONTRACT_SOURCE_TTL;
use crate::explorer::ContractSource;

/// Persistence backend for the cache blob.
///
/// Implementations only move an opaque string; the cache owns the format.
pub trait CacheStorage: Send + Sync {
    /// Read the persisted blob, `None` when nothing was stored yet.
    fn load(&self) -> std::io::Result<Option<String>>;
    /// Replace the persisted blob.
    fn save(&self, blob: &str) -> std::io::Result<()>;
}

/// Blob persistence in a file, written atomically via a temp file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Store the blob at `path`; parent directories are created on save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStorage for FileStorage {
    fn load(&self) -> std::io::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&self.path).map(Some)
    }

    fn save(&self, blob: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, blob)?;
        std::fs::rename(&tmp, &self.path)
    }
}

/// Blob persistence in memory. Clones share the same blob, which makes
/// "new process, same storage" scenarios easy to express in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    /// Create empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryStorage {
    fn load(&self) -> std::io::Result<Option<String>> {
        Ok(self.blob.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone())
    }

    fn save(&self, blob: &str) -> std::io::Result<()> {
        *self.blob.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(blob.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    data: ContractSource,
    timestamp_ms: i64,
}

/// TTL cache of contract-source lookups keyed by chain and address.
///
/// # Examples
///
/// ```rust
/// use allowscan::{ContractSourceCache, MemoryStorage};
/// use allowscan::ContractSource;
/// use alloy_primitives::Address;
///
/// let cache = ContractSourceCache::new(Box::new(MemoryStorage::new()));
/// cache.set(Address::ZERO, 1, ContractSource::verified("Router"));
/// assert!(cache.get(Address::ZERO, 1).is_some());
/// // Different chain, same address: distinct entry
/// assert!(cache.get(Address::ZERO, 137).is_none());
/// ```
pub struct ContractSourceCache {
    storage: Box<dyn CacheStorage>,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ContractSourceCache {
    /// Create a cache over the given storage with the default 24h TTL.
    /// The persisted blob, if any, is loaded immediately.
    pub fn new(storage: Box<dyn CacheStorage>) -> Self {
        let entries = Self::load_entries(storage.as_ref());
        Self {
            storage,
            ttl: CONTRACT_SOURCE_TTL,
            entries: Mutex::new(entries),
        }
    }

    /// Override the entry time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Look up a cached source entry; expired entries are evicted here.
    pub fn get(&self, address: Address, chain_id: ChainId) -> Option<ContractSource> {
        let key = cache_key(address, chain_id);
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let entry = entries.get(&key)?;
        let age_ms = now_ms().saturating_sub(entry.timestamp_ms);
        if age_ms as u128 > self.ttl.as_millis() {
            debug!(key = %key, "Evicting expired contract-source entry");
            entries.remove(&key);
            self.persist(&entries);
            return None;
        }

        Some(entry.data.clone())
    }

    /// Insert or replace an entry and persist the whole blob.
    pub fn set(&self, address: Address, chain_id: ChainId, data: ContractSource) {
        let key = cache_key(address, chain_id);
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(
            key,
            CacheEntry {
                data,
                timestamp_ms: now_ms(),
            },
        );
        self.persist(&entries);
    }

    /// Number of entries currently held (including not-yet-evicted expired
    /// ones).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load_entries(storage: &dyn CacheStorage) -> HashMap<String, CacheEntry> {
        let blob = match storage.load() {
            Ok(Some(blob)) => blob,
            Ok(None) => return HashMap::new(),
            Err(error) => {
                warn!(error = %error, "Failed to read contract-source cache, starting empty");
                return HashMap::new();
            }
        };
        match serde_json::from_str(&blob) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(error = %error, "Failed to parse contract-source cache, starting empty");
                HashMap::new()
            }
        }
    }

    fn persist(&self, entries: &HashMap<String, CacheEntry>) {
        match serde_json::to_string(entries) {
            Ok(blob) => {
                if let Err(error) = self.storage.save(&blob) {
                    warn!(error = %error, "Failed to persist contract-source cache");
                }
            }
            Err(error) => warn!(error = %error, "Failed to serialize contract-source cache"),
        }
    }
}

fn cache_key(address: Address, chain_id: ChainId) -> String {
    format!("{chain_id}-{address:#x}")
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
