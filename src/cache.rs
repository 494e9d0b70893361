//! Key/value cache stores and the book content cache built on them.
//!
//! A [`CacheStore`] is a flat string namespace with `get` and `set`, scoped to
//! one storage root. Two stores are provided:
//!
//! - [`MemoryStore`] - process-local, useful for tests and ephemeral sessions
//! - [`FileStore`] - one file per key under a directory, surviving restarts
//!
//! [`ContentCache`] stores serialized [`BookContent`] under `"book_" + id`.
//! Entries are written once and never expire.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use folio::cache::{ContentCache, MemoryStore};
//! use folio::types::BookContent;
//!
//! let cache = ContentCache::new(Arc::new(MemoryStore::new()));
//! assert!(cache.load("abc123").is_none());
//!
//! cache.store("abc123", &BookContent::single("<p>Hi</p>")).unwrap();
//! assert_eq!(cache.load("abc123").unwrap().current(), "<p>Hi</p>");
//! ```

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::BookContent;

/// Flat key/value persistence.
///
/// Mirrors a browser-style storage: string keys, string values, last write
/// wins. Implementations must be safe to share between tasks.
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, or `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store, one file per key.
///
/// Keys are percent-encoded into file names, so distinct keys never share a
/// file. Encoded names longer than [`MAX_FILE_STEM`] bytes are cut to a prefix
/// followed by the SHA-256 digest of the whole key. Each write goes to its own
/// temporary file first and is then renamed over the entry.
///
/// # Examples
///
/// ```rust,no_run
/// use folio::cache::{CacheStore, FileStore};
///
/// # fn example() -> folio::Result<()> {
/// let store = FileStore::open("/tmp/folio-cache")?;
/// store.set("theme", "dark")?;
/// assert_eq!(store.get("theme").as_deref(), Some("dark"));
/// # Ok(())
/// # }
/// ```
/// Longest encoded key used verbatim as a file name.
pub const MAX_FILE_STEM: usize = 200;

/// Length of the readable prefix kept in front of a hashed file name.
const HASHED_PREFIX_LEN: usize = 64;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// * [`Error::Io`] - If the directory cannot be created
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.entry", file_stem(key)))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!("{}.{}.{}.tmp", file_stem(key), std::process::id(), n))
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable cache entry");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        let tmp = self.temp_path(key);
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp);
                Error::cache(format!("Failed to write {}: {}", path.display(), e))
            })
    }
}

/// The file name (without extension) for `key`.
fn file_stem(key: &str) -> String {
    let encoded = urlencoding::encode(key).into_owned();
    if encoded.len() <= MAX_FILE_STEM {
        return encoded;
    }

    // Percent-encoding is ASCII, so any byte offset is a char boundary.
    let digest = Sha256::digest(key.as_bytes());
    format!("{}-{:x}", &encoded[..HASHED_PREFIX_LEN], digest)
}

/// Typed cache of [`BookContent`] keyed by book id.
#[derive(Clone)]
pub struct ContentCache {
    store: Arc<dyn CacheStore>,
}

impl ContentCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// The storage key for a book: `"book_" + id`.
    pub fn key(book_id: &str) -> String {
        format!("book_{}", book_id)
    }

    /// Loads cached content for `book_id`.
    ///
    /// Entries that fail to deserialize or break the page invariant are
    /// reported and treated as absent.
    pub fn load(&self, book_id: &str) -> Option<BookContent> {
        let key = Self::key(book_id);
        let raw = self.store.get(&key)?;

        match serde_json::from_str::<BookContent>(&raw) {
            Ok(content) if content.is_valid() => {
                debug!(%key, pages = content.len(), "cache hit");
                Some(content)
            }
            Ok(_) => {
                warn!(%key, "cached content has an invalid page index, ignoring");
                None
            }
            Err(e) => {
                warn!(%key, error = %e, "cached content is corrupt, ignoring");
                None
            }
        }
    }

    /// Stores `content` for `book_id`.
    ///
    /// # Errors
    ///
    /// * [`Error::Json`] - If serialization fails
    /// * [`Error::Cache`] - If the underlying store rejects the write
    pub fn store(&self, book_id: &str, content: &BookContent) -> Result<()> {
        let raw = serde_json::to_string(content)?;
        self.store.set(&Self::key(book_id), &raw)
    }

    pub fn contains(&self, book_id: &str) -> bool {
        self.load(book_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_keys_are_encoded_verbatim() {
        assert_eq!(file_stem("book_abc123"), "book_abc123");
        assert_eq!(file_stem("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_long_keys_are_hashed() {
        let long = format!("book_{}", "x".repeat(300));
        let other = format!("book_{}y", "x".repeat(299));

        let stem = file_stem(&long);
        assert_eq!(stem.len(), HASHED_PREFIX_LEN + 1 + 64);
        assert!(stem.starts_with("book_xxx"));
        assert_ne!(stem, file_stem(&other));
        assert_eq!(stem, file_stem(&long));
    }
}
