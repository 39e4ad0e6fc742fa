//! Cache store implementations
//!
//! Provides the [`CacheStore`] trait the handlers are written against,
//! an in-memory store, and a disk store that persists one JSON file per
//! key with an embedded expiry timestamp. Expired entries read as absent,
//! so a hit always means fresh data.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A shared, externally-synchronized key-value collaborator.
///
/// Values are opaque serialized strings; keys and TTLs are computed by the
/// caller. `ttl = None` means the entry does not expire on its own.
/// Concurrent writers may overwrite the same key; last write wins.
pub trait CacheStore: Send + Sync {
    /// Returns the value for `key` if present and unexpired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>);
}

/// Typed convenience wrapper over a [`CacheStore`].
///
/// Serialization failures are logged and treated as a miss or a dropped
/// write; the cache is an optimization, never a source of request errors.
#[derive(Clone)]
pub struct Cache {
    store: std::sync::Arc<dyn CacheStore>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Cache")
    }
}

impl Cache {
    /// Wraps a store for typed access.
    pub fn new(store: std::sync::Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Reads and deserializes the entry for `key`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, %error, "discarding undecodable cache entry");
                None
            }
        }
    }

    /// Serializes and stores `value` under `key`.
    pub fn write<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_string(value) {
            Ok(raw) => self.store.set(key, &raw, ttl),
            Err(error) => {
                tracing::warn!(key, %error, "failed to serialize cache entry");
            }
        }
    }
}

struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

/// Process-local cache store backed by a mutex-guarded map.
///
/// Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, MemoryEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) => entry
                .expires_at
                .is_some_and(|deadline| Instant::now() >= deadline),
            None => return None,
        };
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.lock().insert(key.to_string(), entry);
    }
}

/// On-disk entry envelope.
#[derive(Debug, Serialize, Deserialize)]
struct DiskEntry {
    /// The opaque cached value.
    value: String,
    /// When the entry was written.
    cached_at: DateTime<Utc>,
    /// When the entry stops being served; `None` means no expiry.
    expires_at: Option<DateTime<Utc>>,
}

/// Cache store persisting one JSON file per key.
///
/// Files live in an XDG-compliant cache directory (`~/.cache/govwx/` on
/// Linux) unless a custom directory is given. Expired files are deleted
/// when read.
#[derive(Debug, Clone)]
pub struct DiskStore {
    cache_dir: PathBuf,
}

impl DiskStore {
    /// Creates a store using the XDG cache directory.
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g. no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "govwx")?;
        Some(Self {
            cache_dir: project_dirs.cache_dir().to_path_buf(),
        })
    }

    /// Creates a store rooted at a specific directory.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Keys are prefix-plus-identifier strings; collapse anything that
        // could escape the cache directory.
        let file_name: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{}.json", file_name))
    }
}

impl CacheStore for DiskStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        let content = fs::read_to_string(&path).ok()?;
        let entry: DiskEntry = serde_json::from_str(&content).ok()?;

        if entry.expires_at.is_some_and(|deadline| Utc::now() > deadline) {
            let _ = fs::remove_file(&path);
            return None;
        }

        Some(entry.value)
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        let now = Utc::now();
        let entry = DiskEntry {
            value: value.to_string(),
            cached_at: now,
            expires_at: ttl.and_then(|ttl| chrono::Duration::from_std(ttl).ok())
                .map(|ttl| now + ttl),
        };

        if let Err(error) = fs::create_dir_all(&self.cache_dir) {
            tracing::warn!(%error, "failed to create cache directory");
            return;
        }
        let json = match serde_json::to_string_pretty(&entry) {
            Ok(json) => json,
            Err(error) => {
                tracing::warn!(key, %error, "failed to encode cache entry");
                return;
            }
        };
        if let Err(error) = fs::write(self.entry_path(key), json) {
            tracing::warn!(key, %error, "failed to write cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_disk_cache() -> (DiskStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = DiskStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        store.set("key", "value", None);
        assert_eq!(store.get("key").as_deref(), Some("value"));
    }

    #[test]
    fn test_memory_store_missing_key() {
        let store = MemoryStore::new();
        assert!(store.get("nope").is_none());
    }

    #[test]
    fn test_memory_store_expires_entries() {
        let store = MemoryStore::new();
        store.set("short", "v", Some(Duration::from_millis(10)));
        store.set("forever", "v", None);

        thread::sleep(Duration::from_millis(30));

        assert!(store.get("short").is_none());
        assert_eq!(store.get("forever").as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_store_overwrite_wins() {
        let store = MemoryStore::new();
        store.set("key", "first", None);
        store.set("key", "second", None);
        assert_eq!(store.get("key").as_deref(), Some("second"));
    }

    #[test]
    fn test_disk_store_creates_file_in_cache_directory() {
        let (store, temp_dir) = create_disk_cache();
        store.set("weather-alerts-TXZ211", "payload", Some(Duration::from_secs(60)));

        let expected_path = temp_dir.path().join("weather-alerts-TXZ211.json");
        assert!(expected_path.exists(), "Cache file should exist");
    }

    #[test]
    fn test_disk_store_round_trip() {
        let (store, _temp_dir) = create_disk_cache();
        store.set("key", "payload", Some(Duration::from_secs(60)));
        assert_eq!(store.get("key").as_deref(), Some("payload"));
    }

    #[test]
    fn test_disk_store_expired_entry_reads_as_absent() {
        let (store, _temp_dir) = create_disk_cache();
        store.set("key", "payload", Some(Duration::ZERO));
        thread::sleep(Duration::from_millis(10));
        assert!(store.get("key").is_none());
    }

    #[test]
    fn test_disk_store_entry_without_ttl_persists() {
        let (store, _temp_dir) = create_disk_cache();
        store.set("key", "payload", None);
        assert_eq!(store.get("key").as_deref(), Some("payload"));
    }

    #[test]
    fn test_disk_store_sanitizes_keys() {
        let (store, temp_dir) = create_disk_cache();
        store.set("weather-alerts-../../etc", "payload", None);

        for entry in fs::read_dir(temp_dir.path()).expect("read dir") {
            let entry = entry.expect("dir entry");
            assert!(entry.path().starts_with(temp_dir.path()));
        }
        assert_eq!(store.get("weather-alerts-../../etc").as_deref(), Some("payload"));
    }

    #[test]
    fn test_typed_cache_round_trip() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let cache = Cache::new(store);

        let original = TestData {
            name: "roundtrip".to_string(),
            value: 12345,
        };
        cache.write("key", &original, None);

        let back: TestData = cache.read("key").expect("Should read cache");
        assert_eq!(back, original);
    }

    #[test]
    fn test_typed_cache_undecodable_entry_is_a_miss() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.set("key", "not json", None);

        let cache = Cache::new(store);
        assert!(cache.read::<TestData>("key").is_none());
    }
}
