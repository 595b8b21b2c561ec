//! Single-flight, paginating gateway over a [`Transport`].
//!
//! Concurrent callers for one request path attach to the in-flight fetch
//! and share its outcome. Completed records are served from the cache
//! until they are older than [`GatewayConfig::cache_ttl`]; the next call
//! after that fetches afresh. A failed fetch is evicted before its error
//! reaches any caller, so the next call after a failure retries.
//!
//! Each fetch runs on its own task, so it completes even when every
//! caller waiting on it has gone away.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::api::Transport;
use crate::payload::{decode, Envelope};

/// Default bound on pages followed for one request.
pub const DEFAULT_MAX_PAGES: usize = 128;

/// Default `max=` page size requested from run listings.
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Default lifetime of completed records in the cache.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors from fetching leaderboard data.
///
/// `Clone` so one failure can be handed to every caller attached to the
/// same in-flight request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The API answered with a `{ status, message }` failure document.
    #[error("{status}: {message}")]
    ApiStatus { status: String, message: String },

    /// More pages were linked than the caller allowed.
    #[error("got too many results for {path} (more than {max_pages} pages/{offset} items)")]
    PaginationOverflow {
        path: String,
        max_pages: usize,
        offset: u64,
    },

    /// The response was not the JSON shape expected for `path`.
    #[error("unexpected response for {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Request(err.to_string())
    }
}

/// Tunables for a [`Gateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    pub max_pages: usize,
    pub page_size: u32,
    /// How long completed records are reused. Zero keeps only the
    /// coalescing of in-flight requests.
    pub cache_ttl: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            page_size: DEFAULT_PAGE_SIZE,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Records of a completed fetch, shared between all callers.
pub type Records = Arc<Vec<Value>>;

#[derive(Clone)]
struct Fetched {
    records: Records,
    completed_at: Instant,
}

type PendingFetch = Shared<BoxFuture<'static, Result<Fetched, GatewayError>>>;

struct CacheEntry {
    id: u64,
    fetch: PendingFetch,
}

impl CacheEntry {
    /// In-flight and failed entries never expire; failures evict themselves.
    fn is_expired(&self, ttl: Duration) -> bool {
        matches!(self.fetch.peek(), Some(Ok(fetched)) if fetched.completed_at.elapsed() >= ttl)
    }
}

type Cache = Arc<Mutex<HashMap<String, CacheEntry>>>;

/// Owns the request cache. Clone the surrounding `Arc` to share it.
pub struct Gateway {
    transport: Arc<dyn Transport>,
    config: GatewayConfig,
    cache: Cache,
    next_id: AtomicU64,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, config: GatewayConfig) -> Self {
        Self {
            transport,
            config,
            cache: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Fetch every record behind `path`, following at most the configured
    /// number of pages.
    pub async fn fetch(&self, path: &str) -> Result<Records, GatewayError> {
        self.fetch_with_limit(path, self.config.max_pages).await
    }

    /// Fetch every record behind `path`, following at most `max_pages`.
    ///
    /// The cache is keyed by `path` alone: a call attaching to an existing
    /// entry shares its result regardless of the limit it was started with.
    pub async fn fetch_with_limit(
        &self,
        path: &str,
        max_pages: usize,
    ) -> Result<Records, GatewayError> {
        let pending = {
            let mut cache = self.cache.lock().await;
            let ttl = self.config.cache_ttl;
            cache.retain(|_, entry| !entry.is_expired(ttl));

            match cache.get(path) {
                Some(entry) => {
                    tracing::debug!(path, "Attaching to cached request");
                    entry.fetch.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let fetch = self.spawn_fetch(path.to_string(), max_pages, id);
                    cache.insert(path.to_string(), CacheEntry { id, fetch: fetch.clone() });
                    fetch
                }
            }
        };

        pending.await.map(|fetched| fetched.records)
    }

    /// Fetch a single-resource endpoint such as `games/{slug}`.
    pub async fn fetch_one(&self, path: &str) -> Result<Value, GatewayError> {
        let records = self.fetch(path).await?;
        records.first().cloned().ok_or_else(|| GatewayError::Decode {
            path: path.to_string(),
            reason: "response carried no data".to_string(),
        })
    }

    /// [`fetch_one`](Self::fetch_one), decoded into `T`.
    pub async fn fetch_one_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let value = self.fetch_one(path).await?;
        decode(path, value)
    }

    /// [`fetch`](Self::fetch), decoding every record into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, GatewayError> {
        let records = self.fetch(path).await?;
        records
            .iter()
            .map(|record| decode(path, record.clone()))
            .collect()
    }

    /// Number of paths currently cached or in flight, expired ones included
    /// until the next fetch sweeps them.
    pub async fn cached_paths(&self) -> usize {
        self.cache.lock().await.len()
    }

    // ---- private helpers ----

    /// Start the fetch on its own task and hand back a shareable handle.
    fn spawn_fetch(&self, path: String, max_pages: usize, id: u64) -> PendingFetch {
        let transport = Arc::clone(&self.transport);
        let cache = Arc::clone(&self.cache);

        let task = tokio::spawn({
            let path = path.clone();
            let cache = Arc::clone(&cache);
            async move {
                let outcome = fetch_all_pages(transport.as_ref(), &path, max_pages).await;
                match outcome {
                    Ok(records) => {
                        tracing::debug!(path = %path, records = records.len(), "Request complete");
                        Ok(Fetched {
                            records: Arc::new(records),
                            completed_at: Instant::now(),
                        })
                    }
                    Err(e) => {
                        evict(&cache, &path, id).await;
                        tracing::warn!(path = %path, error = %e, "Request failed, evicted from cache");
                        Err(e)
                    }
                }
            }
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    evict(&cache, &path, id).await;
                    tracing::error!(path = %path, error = %join_error, "Fetch task aborted");
                    Err(GatewayError::Request(format!(
                        "fetch of {path} did not complete: {join_error}"
                    )))
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Remove `path` from the cache if it still holds the fetch numbered `id`.
async fn evict(cache: &Mutex<HashMap<String, CacheEntry>>, path: &str, id: u64) {
    let mut cache = cache.lock().await;
    if cache.get(path).is_some_and(|entry| entry.id == id) {
        cache.remove(path);
    }
}

/// Follow `next` links from offset 0, concatenating each page's data.
async fn fetch_all_pages(
    transport: &dyn Transport,
    path: &str,
    max_pages: usize,
) -> Result<Vec<Value>, GatewayError> {
    let mut records = Vec::new();
    let mut offset: u64 = 0;
    let mut pages: usize = 0;

    loop {
        if pages >= max_pages {
            return Err(GatewayError::PaginationOverflow {
                path: path.to_string(),
                max_pages,
                offset,
            });
        }

        let page_path = with_offset(path, offset);
        tracing::debug!(path = %page_path, page = pages, offset, "Fetching page");
        let envelope: Envelope = decode(&page_path, transport.get(&page_path).await?)?;
        if let Some(failure) = envelope.failure() {
            return Err(failure);
        }

        match envelope.data {
            Value::Array(items) => records.extend(items),
            Value::Null => {}
            single => records.push(single),
        }
        pages += 1;

        match envelope.pagination {
            Some(pagination) if pagination.has_next() => offset += pagination.max,
            _ => return Ok(records),
        }
    }
}

fn with_offset(path: &str, offset: u64) -> String {
    if offset == 0 {
        return path.to_string();
    }
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}offset={offset}")
}
