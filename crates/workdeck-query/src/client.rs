use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};
use workdeck_bridge::BridgeError;

use crate::key::{KeyPrefix, QueryKey};

/// Staleness or collection window that never elapses. Used for immutable
/// lookups such as the authenticated profile.
pub const NEVER: Duration = Duration::MAX;
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(300);
pub const DEFAULT_RETRY: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// `false` suppresses fetching entirely; the consumer treats the result
    /// as absent, never as an error.
    pub enabled: bool,
    pub stale_time: Duration,
    pub gc_time: Duration,
    /// Additional immediate attempts after a retryable failure. Kept at 0
    /// or 1: tracker views prefer fast failure plus a manual retry over
    /// silent hangs.
    pub retry: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            retry: DEFAULT_RETRY,
        }
    }
}

impl QueryOptions {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }

    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }
}

/// Point-in-time view of one cache entry. Errors are data here; nothing is
/// thrown across the boundary to presentation code.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot {
    pub data: Option<Value>,
    pub error: Option<BridgeError>,
    /// True only while no value has ever been present for this key and a
    /// fetch is running. A background refresh over stale data never counts
    /// as loading.
    pub is_loading: bool,
    pub is_fetching: bool,
}

impl QuerySnapshot {
    pub fn idle() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_fetching: false,
        }
    }

    /// Decode the cached payload, if any. Absent data stays `None`.
    pub fn decode<T: DeserializeOwned>(&self, context: &str) -> Result<Option<T>, BridgeError> {
        match &self.data {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|error| BridgeError::decode(context, error.to_string())),
        }
    }

    /// Typed view of this snapshot. A payload that fails to decode folds
    /// into the error channel; the flags carry over unchanged.
    pub fn typed<T: DeserializeOwned>(&self, context: &str) -> TypedSnapshot<T> {
        match self.decode::<T>(context) {
            Ok(data) => TypedSnapshot {
                data,
                error: self.error.clone(),
                is_loading: self.is_loading,
                is_fetching: self.is_fetching,
            },
            Err(error) => TypedSnapshot {
                data: None,
                error: Some(error),
                is_loading: self.is_loading,
                is_fetching: self.is_fetching,
            },
        }
    }
}

/// [`QuerySnapshot`] with the payload decoded to a concrete wire type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedSnapshot<T> {
    pub data: Option<T>,
    pub error: Option<BridgeError>,
    pub is_loading: bool,
    pub is_fetching: bool,
}

impl<T> TypedSnapshot<T> {
    pub fn idle() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_fetching: false,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedValue {
    value: Value,
    stored_at: Instant,
}

#[derive(Debug)]
struct Inflight {
    generation: u64,
    done: broadcast::Sender<()>,
}

#[derive(Debug)]
struct CacheEntry {
    value: Option<CachedValue>,
    error: Option<BridgeError>,
    invalidated: bool,
    inflight: Option<Inflight>,
    last_used_at: Instant,
    gc_time: Duration,
}

impl CacheEntry {
    fn new(now: Instant, gc_time: Duration) -> Self {
        Self {
            value: None,
            error: None,
            invalidated: false,
            inflight: None,
            last_used_at: now,
            gc_time,
        }
    }

    fn snapshot(&self) -> QuerySnapshot {
        QuerySnapshot {
            data: self.value.as_ref().map(|cached| cached.value.clone()),
            error: self.error.clone(),
            is_loading: self.value.is_none() && self.inflight.is_some(),
            is_fetching: self.inflight.is_some(),
        }
    }

    fn is_fresh(&self, now: Instant, stale_time: Duration) -> bool {
        !self.invalidated
            && self
                .value
                .as_ref()
                .is_some_and(|cached| now.duration_since(cached.stored_at) < stale_time)
    }
}

#[derive(Debug)]
struct ClientInner {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    fetch_sequence: AtomicU64,
}

/// Process-wide cache of asynchronous query results. Cloning is cheap and
/// shares the cache. Entries are replaced whole; consumers never mutate
/// cached data, only request invalidation or refetch.
#[derive(Debug, Clone)]
pub struct QueryClient {
    inner: Arc<ClientInner>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryClient {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ClientInner {
                entries: RwLock::new(HashMap::new()),
                fetch_sequence: AtomicU64::new(0),
            }),
        }
    }

    /// Resolve one query according to the cache policy.
    ///
    /// A fresh cached value is served without fetching. A stale value is
    /// served immediately while one background refetch runs
    /// (stale-while-revalidate). With no value at all, the call awaits the
    /// single authoritative fetch for this key; structurally equal keys
    /// issued concurrently share that fetch.
    pub async fn query<F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> QuerySnapshot
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BridgeError>> + Send + 'static,
    {
        if !options.enabled {
            return QuerySnapshot::idle();
        }

        let awaited_generation = {
            let now = Instant::now();
            let mut entries = self
                .inner
                .entries
                .write()
                .expect("query cache entry lock poisoned");
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(now, options.gc_time));
            entry.last_used_at = now;
            entry.gc_time = options.gc_time;

            if entry.is_fresh(now, options.stale_time) {
                trace!(key = %key, "serving fresh cached value");
                return entry.snapshot();
            }

            if entry.value.is_some() {
                // Stale: serve what we have, revalidate in the background.
                if entry.inflight.is_none() {
                    self.spawn_fetch(&key, entry, options.retry, fetcher);
                }
                return entry.snapshot();
            }

            if let Some(inflight) = &entry.inflight {
                inflight.generation
            } else {
                self.spawn_fetch(&key, entry, options.retry, fetcher)
            }
        };

        self.await_generation(&key, awaited_generation).await
    }

    /// Current state of a key without triggering any fetch.
    pub fn peek(&self, key: &QueryKey) -> QuerySnapshot {
        let entries = self
            .inner
            .entries
            .read()
            .expect("query cache entry lock poisoned");
        entries
            .get(key)
            .map(CacheEntry::snapshot)
            .unwrap_or_else(QuerySnapshot::idle)
    }

    /// Force a new authoritative fetch for this key, superseding any fetch
    /// already in flight (the older response is dropped, never applied).
    /// Backs the manual retry affordance.
    pub async fn refetch<F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> QuerySnapshot
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BridgeError>> + Send + 'static,
    {
        if !options.enabled {
            return QuerySnapshot::idle();
        }

        let generation = {
            let now = Instant::now();
            let mut entries = self
                .inner
                .entries
                .write()
                .expect("query cache entry lock poisoned");
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(now, options.gc_time));
            entry.last_used_at = now;
            entry.gc_time = options.gc_time;
            self.spawn_fetch(&key, entry, options.retry, fetcher)
        };

        self.await_generation(&key, generation).await
    }

    /// Mark every entry under `prefix` stale, forcing a refetch on next
    /// access. Used after mutations such as a completed OAuth flow.
    pub fn invalidate_prefix(&self, prefix: &KeyPrefix) {
        let mut entries = self
            .inner
            .entries
            .write()
            .expect("query cache entry lock poisoned");
        let mut marked = 0usize;
        for (key, entry) in entries.iter_mut() {
            if prefix.matches(key) {
                entry.invalidated = true;
                marked += 1;
            }
        }
        debug!(prefix = %prefix, marked, "invalidated query cache prefix");
    }

    /// Drop every entry under `prefix` outright.
    pub fn remove_prefix(&self, prefix: &KeyPrefix) {
        let mut entries = self
            .inner
            .entries
            .write()
            .expect("query cache entry lock poisoned");
        let before = entries.len();
        entries.retain(|key, _| !prefix.matches(key));
        debug!(prefix = %prefix, removed = before - entries.len(), "removed query cache prefix");
    }

    /// Evict entries that have not been used for their collection window.
    /// Explicit rather than a background daemon so callers and tests drive
    /// time; production wires this to a coarse timer.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut entries = self
            .inner
            .entries
            .write()
            .expect("query cache entry lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| {
            entry.inflight.is_some() || now.duration_since(entry.last_used_at) < entry.gc_time
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "query cache sweep evicted unused entries");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.inner
            .entries
            .read()
            .expect("query cache entry lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn the authoritative fetch for `entry`, replacing (and thereby
    /// superseding) any fetch currently in flight. Returns the generation
    /// to await. Caller holds the entry lock.
    fn spawn_fetch<F, Fut>(
        &self,
        key: &QueryKey,
        entry: &mut CacheEntry,
        retry: u32,
        fetcher: F,
    ) -> u64
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BridgeError>> + Send + 'static,
    {
        let generation = self.inner.fetch_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let (done, _) = broadcast::channel(1);
        entry.inflight = Some(Inflight {
            generation,
            done: done.clone(),
        });
        entry.error = None;

        let inner = Arc::clone(&self.inner);
        let key = key.clone();
        trace!(key = %key, generation, "starting query fetch");
        tokio::spawn(async move {
            let mut attempts_left = retry;
            let result = loop {
                match fetcher().await {
                    Ok(value) => break Ok(value),
                    Err(error) if attempts_left > 0 && error.is_retryable() => {
                        attempts_left -= 1;
                        warn!(key = %key, %error, "query fetch failed; retrying");
                    }
                    Err(error) => break Err(error),
                }
            };
            apply_fetch_result(&inner, &key, generation, result);
            let _ = done.send(());
        });

        generation
    }

    /// Wait until the given fetch generation has been applied or superseded,
    /// then report the entry's state. Dropping the future never aborts the
    /// fetch itself; cancellation is advisory only.
    async fn await_generation(&self, key: &QueryKey, generation: u64) -> QuerySnapshot {
        loop {
            let mut receiver = {
                let entries = self
                    .inner
                    .entries
                    .read()
                    .expect("query cache entry lock poisoned");
                let Some(entry) = entries.get(key) else {
                    return QuerySnapshot::idle();
                };
                match &entry.inflight {
                    None => return entry.snapshot(),
                    Some(inflight) if inflight.generation != generation => {
                        return entry.snapshot();
                    }
                    Some(inflight) => inflight.done.subscribe(),
                }
            };
            let _ = receiver.recv().await;
        }
    }
}

fn apply_fetch_result(
    inner: &ClientInner,
    key: &QueryKey,
    generation: u64,
    result: Result<Value, BridgeError>,
) {
    let mut entries = inner
        .entries
        .write()
        .expect("query cache entry lock poisoned");
    let Some(entry) = entries.get_mut(key) else {
        trace!(key = %key, generation, "dropping fetch result for evicted entry");
        return;
    };
    match &entry.inflight {
        Some(inflight) if inflight.generation == generation => {}
        _ => {
            trace!(key = %key, generation, "dropping superseded fetch result");
            return;
        }
    }
    entry.inflight = None;
    match result {
        Ok(value) => {
            entry.value = Some(CachedValue {
                value,
                stored_at: Instant::now(),
            });
            entry.error = None;
            entry.invalidated = false;
        }
        Err(error) => {
            warn!(key = %key, %error, "query fetch failed");
            entry.error = Some(error);
        }
    }
}
