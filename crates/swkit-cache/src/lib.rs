//! # SwKit Cache
//!
//! Named response stores for the SwKit offline worker runtime.
//!
//! ## Architecture
//!
//! ```text
//! CacheStorage
//!     ├── Store "swkit-static-v1"     (immutable assets, populated at install)
//!     │       └── CacheKey → CacheEntry
//!     └── Store "swkit-dynamic-v1"    (pages and API payloads, populated lazily)
//!             └── CacheKey → CacheEntry
//! ```
//!
//! Stores are whole-key overwrite maps: every `put` is a complete
//! replacement, last write wins, no merge. Staleness is handled only by
//! whole-store replacement on a version bump: [`StoreNames`] derives the
//! retained set from the current version string, and activation deletes
//! everything else.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use hashbrown::HashMap;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use swkit_net::{Request, Response};

/// Errors that can occur replaying cached entries.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cached entry has invalid status: {0}")]
    InvalidStatus(u16),
}

/// Key identifying a cached response: method plus normalized URL.
///
/// Normalization strips the fragment; the query is significant and kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    method: String,
    url: String,
}

impl CacheKey {
    /// Build a key from a method and URL.
    pub fn new(method: &Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method: method.as_str().to_string(),
            url: url.into(),
        }
    }

    /// Build a key for a request.
    pub fn for_request(request: &Request) -> Self {
        Self::new(&request.method, &request.url)
    }

    /// The normalized URL string.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A captured response ready for replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Request URL.
    pub url: String,

    /// Request method.
    pub method: String,

    /// Response status.
    pub status: u16,

    /// Response headers (UTF-8 values only; others are dropped at capture).
    pub headers: HashMap<String, String>,

    /// Response body.
    pub body: Vec<u8>,

    /// Capture timestamp (ms since epoch).
    pub cached_at: u64,
}

impl CacheEntry {
    /// Capture a response for a request.
    pub fn capture(request: &Request, response: &Response) -> Self {
        let mut headers = HashMap::new();
        for (name, value) in response.headers.iter() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        Self {
            url: request.url.to_string(),
            method: request.method.as_str().to_string(),
            status: response.status.as_u16(),
            headers,
            body: response.body.to_vec(),
            cached_at: now_millis(),
        }
    }

    /// Rebuild the captured response verbatim.
    pub fn to_response(&self) -> Result<Response, CacheError> {
        let status = StatusCode::from_u16(self.status)
            .map_err(|_| CacheError::InvalidStatus(self.status))?;
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers.iter() {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
        Ok(Response {
            status,
            headers,
            body: self.body.clone().into(),
        })
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A named store of cached responses.
#[derive(Debug, Default)]
pub struct Store {
    name: String,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl Store {
    /// Create an empty store.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: HashMap::new(),
        }
    }

    /// The store's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an entry.
    pub fn match_key(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Insert an entry, overwriting any previous one for the same key.
    pub fn put(&mut self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Capture and insert a response for a request.
    pub fn put_response(&mut self, request: &Request, response: &Response) {
        self.put(
            CacheKey::for_request(request),
            CacheEntry::capture(request, response),
        );
    }

    /// Remove an entry.
    pub fn delete(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// All keys in the store.
    pub fn keys(&self) -> Vec<&CacheKey> {
        self.entries.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The set of named stores owned by the worker.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: HashMap<String, Store>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store, creating it if needed. Idempotent: opening an existing
    /// name returns the same underlying data.
    pub fn open(&mut self, name: &str) -> &mut Store {
        self.caches
            .entry(name.to_string())
            .or_insert_with(|| Store::new(name))
    }

    /// Read-only access to a store, if it exists.
    pub fn get(&self, name: &str) -> Option<&Store> {
        self.caches.get(name)
    }

    /// Check if a store exists.
    pub fn has(&self, name: &str) -> bool {
        self.caches.contains_key(name)
    }

    /// Delete a store and everything in it.
    pub fn delete(&mut self, name: &str) -> bool {
        let deleted = self.caches.remove(name).is_some();
        if deleted {
            debug!(store = name, "Deleted store");
        }
        deleted
    }

    /// Names of all existing stores.
    pub fn names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    /// Look a key up across every store.
    pub fn match_any(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.caches.values().find_map(|store| store.match_key(key))
    }
}

/// Store names for a worker version.
///
/// The version string is the only invalidation mechanism: bumping it changes
/// both names, and activation deletes every store outside the retained set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    pub static_store: String,
    pub dynamic_store: String,
}

impl StoreNames {
    /// Derive the store names for a version.
    pub fn for_version(prefix: &str, version: &str) -> Self {
        Self {
            static_store: format!("{prefix}-static-{version}"),
            dynamic_store: format!("{prefix}-dynamic-{version}"),
        }
    }

    /// The retained set: stores that must survive activation cleanup.
    pub fn retained(&self) -> [&str; 2] {
        [&self.static_store, &self.dynamic_store]
    }

    /// Whether a store name belongs to the retained set.
    pub fn is_retained(&self, name: &str) -> bool {
        name == self.static_store || name == self.dynamic_store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_for(url: &str, body: &[u8]) -> (CacheKey, CacheEntry) {
        let url = Url::parse(url).unwrap();
        let request = Request::get(url);
        let response = Response::new(StatusCode::OK, "text/plain", body.to_vec());
        (
            CacheKey::for_request(&request),
            CacheEntry::capture(&request, &response),
        )
    }

    #[test]
    fn test_key_strips_fragment() {
        let url = Url::parse("https://example.com/about/#team").unwrap();
        let bare = Url::parse("https://example.com/about/").unwrap();
        assert_eq!(
            CacheKey::new(&Method::GET, &url),
            CacheKey::new(&Method::GET, &bare)
        );
    }

    #[test]
    fn test_key_keeps_query() {
        let a = Url::parse("https://example.com/api/projects?page=1").unwrap();
        let b = Url::parse("https://example.com/api/projects?page=2").unwrap();
        assert_ne!(
            CacheKey::new(&Method::GET, &a),
            CacheKey::new(&Method::GET, &b)
        );
    }

    #[test]
    fn test_key_distinguishes_method() {
        let url = Url::parse("https://example.com/api/projects").unwrap();
        assert_ne!(
            CacheKey::new(&Method::GET, &url),
            CacheKey::new(&Method::POST, &url)
        );
    }

    #[test]
    fn test_entry_round_trip() {
        let url = Url::parse("https://example.com/api/projects").unwrap();
        let request = Request::get(url);
        let response = Response::new(StatusCode::OK, "application/json", &b"[1,2,3]"[..]);

        let entry = CacheEntry::capture(&request, &response);
        let replayed = entry.to_response().unwrap();

        assert_eq!(replayed.status, StatusCode::OK);
        assert_eq!(replayed.bytes().as_ref(), b"[1,2,3]");
        assert_eq!(
            replayed.content_type().unwrap().essence_str(),
            "application/json"
        );
    }

    #[test]
    fn test_put_overwrites() {
        let mut store = Store::new("test");
        let (key, first) = entry_for("https://example.com/a", b"one");
        let (_, second) = entry_for("https://example.com/a", b"two");

        store.put(key.clone(), first);
        store.put(key.clone(), second);

        assert_eq!(store.len(), 1);
        assert_eq!(store.match_key(&key).unwrap().body, b"two");
    }

    #[test]
    fn test_put_is_idempotent() {
        let mut store = Store::new("test");
        let (key, entry) = entry_for("https://example.com/a", b"one");

        store.put(key.clone(), entry.clone());
        let after_once = store.match_key(&key).unwrap().body.clone();
        store.put(key.clone(), entry);

        assert_eq!(store.len(), 1);
        assert_eq!(store.match_key(&key).unwrap().body, after_once);
    }

    #[test]
    fn test_open_is_idempotent() {
        let mut storage = CacheStorage::new();
        let (key, entry) = entry_for("https://example.com/a", b"one");
        storage.open("v1").put(key.clone(), entry);

        // Re-opening must see the same data.
        assert!(storage.open("v1").match_key(&key).is_some());
        assert_eq!(storage.names().len(), 1);
    }

    #[test]
    fn test_match_any_searches_all_stores() {
        let mut storage = CacheStorage::new();
        let (key, entry) = entry_for("https://example.com/page", b"html");
        storage.open("swkit-dynamic-v1").put(key.clone(), entry);
        storage.open("swkit-static-v1");

        assert!(storage.match_any(&key).is_some());
        let (missing, _) = entry_for("https://example.com/other", b"");
        assert!(storage.match_any(&missing).is_none());
    }

    #[test]
    fn test_delete_store() {
        let mut storage = CacheStorage::new();
        storage.open("v1");
        assert!(storage.has("v1"));
        assert!(storage.delete("v1"));
        assert!(!storage.has("v1"));
        assert!(!storage.delete("v1"));
    }

    #[test]
    fn test_store_names_derivation() {
        let names = StoreNames::for_version("swkit", "v2.0.0");
        assert_eq!(names.static_store, "swkit-static-v2.0.0");
        assert_eq!(names.dynamic_store, "swkit-dynamic-v2.0.0");
        assert_eq!(
            names.retained(),
            ["swkit-static-v2.0.0", "swkit-dynamic-v2.0.0"]
        );
        assert!(names.is_retained("swkit-static-v2.0.0"));
        assert!(!names.is_retained("swkit-static-v1.0.0"));
    }

    #[test]
    fn test_version_bump_changes_names() {
        let v1 = StoreNames::for_version("swkit", "v1");
        let v2 = StoreNames::for_version("swkit", "v2");
        assert_ne!(v1, v2);
        assert!(!v2.is_retained(&v1.static_store));
        assert!(!v2.is_retained(&v1.dynamic_store));
    }
}
