//! TTL response cache.
//!
//! Memoizes full HTTP responses keyed by normalized request identity.
//! Entries expire by time-to-live only; there is no invalidation API and
//! no single-flight guarantee, so concurrent identical misses may each
//! compute and store (last write wins).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tokio::sync::RwLock;

/// A stored response: status, headers and buffered body bytes.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[derive(Debug)]
struct StoredEntry {
    response: CachedResponse,
    stored_at: Instant,
    ttl: Duration,
}

impl StoredEntry {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }
}

/// Concurrent response memoization with per-entry TTLs.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an unexpired entry. Expired entries are dropped on access.
    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.response.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(StoredEntry::is_expired) {
            entries.remove(key);
        }
        None
    }

    /// Store a response under the given key for `ttl`. Overwrites any
    /// previous entry.
    pub async fn insert(&self, key: String, response: CachedResponse, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            StoredEntry {
                response,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Normalized request identity: method, path and lexicographically
/// sorted query pairs, so parameter order does not split cache entries.
pub fn request_key(method: &Method, uri: &Uri) -> String {
    let mut pairs: Vec<&str> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .collect();
    pairs.sort_unstable();
    format!("{} {}?{}", method, uri.path(), pairs.join("&"))
}
