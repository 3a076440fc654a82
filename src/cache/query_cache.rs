//! Keyed query cache with request deduplication
//!
//! Serves cached data immediately and revalidates in the background:
//! - At most one fetch in flight per key; later callers attach to it
//! - Failed refreshes keep the last good payload (stale-while-error)
//! - Invalidation marks entries stale without clearing their data
//! - Bounded LRU eviction that never drops an in-flight entry

use super::entry::{is_stale, QueryEntry, QueryOptions, QueryStatus};
use crate::config::CacheConfig;
use crate::error::{ApiError, Result};
use crate::keys::QueryKey;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, warn};

type InFlight = Shared<BoxFuture<'static, QueryEntry>>;

/// Change notification for views rendering cached data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A fetch was scheduled for the key
    Fetching(QueryKey),
    /// A fetch for the key resolved (successfully or not)
    Updated(QueryKey),
    /// The key was marked stale
    Invalidated(QueryKey),
    /// The key was dropped by LRU eviction
    Evicted(QueryKey),
}

/// Cache statistics - snapshot of counters since creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently held
    pub entry_count: usize,
    /// Lookups that found an existing entry
    pub hit_count: u64,
    /// Lookups that created an entry
    pub miss_count: u64,
    /// Fetches actually scheduled
    pub fetch_count: u64,
    /// Lookups that attached to an in-flight fetch
    pub dedup_count: u64,
    pub eviction_count: u64,
}

impl CacheStats {
    /// Hit rate as percentage (0-100)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            (self.hit_count as f64 / total as f64) * 100.0
        }
    }
}

/// Internal entry - not exposed, readers get [`QueryEntry`] snapshots
struct Slot {
    data: Option<serde_json::Value>,
    status: QueryStatus,
    error: Option<ApiError>,
    fetched_at: Option<Instant>,
    max_age: Duration,
    invalidated: bool,
    /// Bumped on every invalidation; a fetch started under an older epoch
    /// resolves stale
    epoch: u64,
    in_flight: Option<InFlight>,
    last_used: u64,
}

impl Slot {
    fn new(max_age: Duration) -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            error: None,
            fetched_at: None,
            max_age,
            invalidated: false,
            epoch: 0,
            in_flight: None,
            last_used: 0,
        }
    }

    fn is_stale(&self, now: Instant) -> bool {
        is_stale(self.fetched_at, self.max_age, self.invalidated, now)
    }

    fn snapshot(&self, key: &QueryKey, now: Instant) -> QueryEntry {
        QueryEntry {
            key: key.clone(),
            data: self.data.clone(),
            status: self.status,
            error: self.error.clone(),
            fetched_at: self.fetched_at,
            is_stale: self.is_stale(now),
            is_fetching: self.in_flight.is_some(),
        }
    }
}

struct CacheState {
    slots: HashMap<QueryKey, Slot>,
    /// Temporal index for LRU eviction: access tick -> key
    lru: BTreeMap<u64, QueryKey>,
    tick: u64,
    stats: CacheStats,
}

impl CacheState {
    /// Evict least recently used entries until within capacity.
    /// In-flight entries and `keep` are skipped.
    fn evict_overflow(&mut self, max_entries: usize, keep: &QueryKey) -> Vec<QueryKey> {
        let mut evicted = Vec::new();
        if self.slots.len() <= max_entries {
            return evicted;
        }

        let candidates: Vec<(u64, QueryKey)> = self
            .lru
            .iter()
            .map(|(tick, key)| (*tick, key.clone()))
            .collect();

        for (tick, key) in candidates {
            if self.slots.len() <= max_entries {
                break;
            }
            if &key == keep {
                continue;
            }
            let busy = self
                .slots
                .get(&key)
                .is_some_and(|slot| slot.in_flight.is_some());
            if busy {
                continue;
            }
            self.slots.remove(&key);
            self.lru.remove(&tick);
            self.stats.eviction_count += 1;
            evicted.push(key);
        }

        evicted
    }
}

struct CacheInner {
    config: CacheConfig,
    state: Mutex<CacheState>,
    events: broadcast::Sender<CacheEvent>,
}

impl CacheInner {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: CacheEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Fetch-resolution path: the only writer of data/status/error
    fn resolve(
        &self,
        key: &QueryKey,
        epoch: u64,
        result: Result<serde_json::Value>,
    ) -> QueryEntry {
        let now = Instant::now();
        let mut state = self.lock();

        let entry = match state.slots.get_mut(key) {
            Some(slot) => {
                slot.in_flight = None;
                match result {
                    Ok(data) => {
                        slot.data = Some(data);
                        slot.status = QueryStatus::Success;
                        slot.error = None;
                        slot.fetched_at = Some(now);
                        slot.invalidated = slot.epoch != epoch;
                    }
                    Err(err) => {
                        warn!(key = %key, error = %err, "Query fetch failed");
                        slot.status = QueryStatus::Error;
                        slot.error = Some(err);
                    }
                }
                slot.snapshot(key, now)
            }
            None => {
                // Unreachable while in-flight entries are protected from
                // eviction; report the result without caching it
                let mut detached = QueryEntry::idle(key.clone());
                match result {
                    Ok(data) => {
                        detached.data = Some(data);
                        detached.status = QueryStatus::Success;
                        detached.fetched_at = Some(now);
                    }
                    Err(err) => {
                        detached.status = QueryStatus::Error;
                        detached.error = Some(err);
                    }
                }
                detached
            }
        };

        drop(state);
        self.emit(CacheEvent::Updated(key.clone()));
        entry
    }
}

/// Process-wide query cache
///
/// Cloning is cheap; clones share the same entries.
///
/// # Example
///
/// ```rust,ignore
/// use campus_sdk::{keys, QueryCache, QueryOptions};
///
/// let cache = QueryCache::new(CacheConfig::default());
/// let client = client.clone();
///
/// // Returns immediately; schedules a fetch when idle or stale
/// let entry = cache.get(&keys::colleges(), move || {
///     let client = client.clone();
///     async move { client.list_colleges().await }
/// }, QueryOptions::default());
///
/// if let Some(colleges) = entry.data_as::<Vec<College>>()? {
///     render(colleges);
/// }
/// ```
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(CacheInner {
                config,
                state: Mutex::new(CacheState {
                    slots: HashMap::new(),
                    lru: BTreeMap::new(),
                    tick: 0,
                    stats: CacheStats::default(),
                }),
                events,
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Return the current entry, scheduling a fetch when it is idle or stale.
    ///
    /// Never blocks. If a fetch for `key` is already in flight no new request
    /// is issued. The fetch runs on the current tokio runtime; outside a
    /// runtime it runs only when awaited through [`QueryCache::fetch`].
    pub fn get<T, F, Fut>(&self, key: &QueryKey, fetcher: F, options: QueryOptions) -> QueryEntry
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.lookup(key, fetcher, options).0
    }

    /// Like [`QueryCache::get`], then wait for the in-flight fetch (if any)
    /// and return the resolved entry
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        fetcher: F,
        options: QueryOptions,
    ) -> QueryEntry
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        match self.lookup(key, fetcher, options) {
            (_, Some(in_flight)) => in_flight.await,
            (entry, None) => entry,
        }
    }

    /// Read an entry without scheduling anything
    pub fn peek(&self, key: &QueryKey) -> Option<QueryEntry> {
        let now = Instant::now();
        let state = self.inner.lock();
        state.slots.get(key).map(|slot| slot.snapshot(key, now))
    }

    /// Mark every entry whose key starts with `prefix` stale.
    ///
    /// Existing data is kept and nothing is fetched; the next `get` for a
    /// matching key refetches. Returns the number of entries that were not
    /// already marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut state = self.inner.lock();
        let mut newly_stale = Vec::new();

        for (key, slot) in state
            .slots
            .iter_mut()
            .filter(|(key, _)| key.starts_with(prefix))
        {
            slot.epoch += 1;
            if !slot.invalidated {
                slot.invalidated = true;
                newly_stale.push(key.clone());
            }
        }
        drop(state);

        debug!(prefix = %prefix, count = newly_stale.len(), "Invalidated queries");
        let count = newly_stale.len();
        for key in newly_stale {
            self.inner.emit(CacheEvent::Invalidated(key));
        }
        count
    }

    pub fn invalidate_all(&self) -> usize {
        self.invalidate(&QueryKey::root())
    }

    /// Subscribe to change events
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.inner.lock();
        CacheStats {
            entry_count: state.slots.len(),
            ..state.stats
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup<T, F, Fut>(
        &self,
        key: &QueryKey,
        fetcher: F,
        options: QueryOptions,
    ) -> (QueryEntry, Option<InFlight>)
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let now = Instant::now();
        let max_age = options.max_age.unwrap_or(self.inner.config.max_age);

        let mut state = self.inner.lock();
        state.tick += 1;
        let tick = state.tick;

        let CacheState {
            slots, lru, stats, ..
        } = &mut *state;

        let slot = match slots.entry(key.clone()) {
            Entry::Occupied(occupied) => {
                stats.hit_count += 1;
                lru.remove(&occupied.get().last_used);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => {
                stats.miss_count += 1;
                vacant.insert(Slot::new(max_age))
            }
        };
        slot.last_used = tick;
        slot.max_age = max_age;
        lru.insert(tick, key.clone());

        let mut scheduled = None;
        let in_flight = match &slot.in_flight {
            Some(existing) if options.enabled => {
                stats.dedup_count += 1;
                debug!(key = %key, "Attaching to in-flight fetch");
                Some(existing.clone())
            }
            Some(_) => None,
            None if options.enabled
                && (slot.status == QueryStatus::Idle || slot.is_stale(now)) =>
            {
                let fut = self.start_fetch(key.clone(), slot.epoch, fetcher);
                slot.status = QueryStatus::Loading;
                slot.in_flight = Some(fut.clone());
                stats.fetch_count += 1;
                scheduled = Some(fut.clone());
                Some(fut)
            }
            None => None,
        };

        let entry = slot.snapshot(key, now);
        let evicted = state.evict_overflow(self.inner.config.max_entries, key);
        drop(state);

        for evicted_key in evicted {
            debug!(key = %evicted_key, "Evicted query");
            self.inner.emit(CacheEvent::Evicted(evicted_key));
        }

        if let Some(fut) = scheduled {
            debug!(key = %key, "Scheduling fetch");
            self.inner.emit(CacheEvent::Fetching(key.clone()));
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(fut);
                }
                Err(_) => {
                    warn!(key = %key, "No tokio runtime; fetch runs when awaited");
                }
            }
        }

        (entry, in_flight)
    }

    fn start_fetch<T, F, Fut>(&self, key: QueryKey, epoch: u64, fetcher: F) -> InFlight
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let retries = inner.config.network_retries;

        async move {
            let mut attempt = 0;
            let result = loop {
                match fetcher().await {
                    Err(err) if err.kind.is_retryable() && attempt < retries => {
                        attempt += 1;
                        debug!(key = %key, attempt, error = %err, "Retrying fetch");
                    }
                    other => break other,
                }
            };
            let result =
                result.and_then(|data| serde_json::to_value(data).map_err(ApiError::from));
            inner.resolve(&key, epoch, result)
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::keys;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher that replays scripted results and counts invocations
    fn scripted(
        responses: Vec<Result<Value>>,
    ) -> (
        impl Fn() -> futures::future::Ready<Result<Value>> + Clone + Send + Sync + 'static,
        Arc<AtomicUsize>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let queue = Arc::new(Mutex::new(VecDeque::from(responses)));
        let counter = Arc::clone(&calls);
        let fetcher = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let next = queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::network("script exhausted")));
            futures::future::ready(next)
        };
        (fetcher, calls)
    }

    fn fresh_for(secs: u64) -> QueryOptions {
        QueryOptions::new().with_max_age(Duration::from_secs(secs))
    }

    #[tokio::test]
    async fn test_concurrent_gets_issue_one_request() {
        let cache = QueryCache::new(CacheConfig::default());
        let (fetcher, calls) = scripted(vec![Ok(json!(["college-a"]))]);
        let key = keys::colleges();

        let first = cache.get(&key, fetcher.clone(), QueryOptions::default());
        let second = cache.get(&key, fetcher.clone(), QueryOptions::default());
        assert_eq!(first.status, QueryStatus::Loading);
        assert!(second.is_fetching);

        let resolved = cache.fetch(&key, fetcher, QueryOptions::default()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolved.status, QueryStatus::Success);
        assert_eq!(resolved.data, Some(json!(["college-a"])));
        assert_eq!(cache.stats().fetch_count, 1);
        assert_eq!(cache.stats().dedup_count, 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_good_data() {
        let cache = QueryCache::new(CacheConfig::default());
        let (fetcher, calls) = scripted(vec![
            Ok(json!({"name": "v1"})),
            Err(ApiError::network("connection reset")),
            Err(ApiError::network("connection reset")),
        ]);
        let key = keys::college("c1");

        cache.fetch(&key, fetcher.clone(), QueryOptions::default()).await;
        let entry = cache.fetch(&key, fetcher, QueryOptions::default()).await;

        // One initial call, one failed call, one silent retry
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(entry.status, QueryStatus::Error);
        assert_eq!(entry.data, Some(json!({"name": "v1"})));
        assert_eq!(entry.error.map(|e| e.kind), Some(ErrorKind::Network));
    }

    #[tokio::test]
    async fn test_network_retry_recovers() {
        let cache = QueryCache::new(CacheConfig::default());
        let (fetcher, calls) = scripted(vec![
            Err(ApiError::network("timeout")),
            Ok(json!([])),
        ]);

        let entry = cache
            .fetch(&keys::programs(), fetcher, QueryOptions::default())
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(entry.is_success());
        assert!(entry.error.is_none());
    }

    #[tokio::test]
    async fn test_non_network_errors_not_retried() {
        for status in [400u16, 401, 404, 500] {
            let cache = QueryCache::new(CacheConfig::default());
            let (fetcher, calls) = scripted(vec![
                Err(ApiError::from_status(status, "nope")),
                Ok(json!([])),
            ]);

            let entry = cache
                .fetch(&keys::inquiries(), fetcher, QueryOptions::default())
                .await;
            assert_eq!(calls.load(Ordering::SeqCst), 1, "status {}", status);
            assert!(entry.is_error());
            assert!(entry.data.is_none());
        }
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch_of_fresh_entry() {
        let cache = QueryCache::new(CacheConfig::default());
        let (fetcher, calls) = scripted(vec![Ok(json!(1)), Ok(json!(2))]);
        let key = keys::colleges();

        cache.fetch(&key, fetcher.clone(), fresh_for(60)).await;
        let fresh = cache.get(&key, fetcher.clone(), fresh_for(60));
        assert!(!fresh.is_stale);
        assert!(!fresh.is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(cache.invalidate(&key), 1);
        let stale = cache.peek(&key).unwrap();
        assert!(stale.is_stale);
        assert_eq!(stale.data, Some(json!(1)));

        let refreshed = cache.fetch(&key, fetcher, fresh_for(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed.data, Some(json!(2)));
        assert!(!refreshed.is_stale);
    }

    #[tokio::test]
    async fn test_invalidate_twice_same_as_once() {
        let cache = QueryCache::new(CacheConfig::default());
        let (fetcher, calls) = scripted(vec![Ok(json!(1)), Ok(json!(2)), Ok(json!(3))]);
        let key = keys::forms();

        cache.fetch(&key, fetcher.clone(), fresh_for(60)).await;
        assert_eq!(cache.invalidate(&key), 1);
        assert_eq!(cache.invalidate(&key), 0);

        cache.fetch(&key, fetcher.clone(), fresh_for(60)).await;
        cache.fetch(&key, fetcher, fresh_for(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_by_prefix() {
        let cache = QueryCache::new(CacheConfig::default());
        let (fetcher, _) = scripted(vec![Ok(json!(1)), Ok(json!(2)), Ok(json!(3))]);

        for key in [keys::gallery(), keys::gallery_image("g1"), keys::colleges()] {
            cache.fetch(&key, fetcher.clone(), fresh_for(60)).await;
        }

        assert_eq!(cache.invalidate(&keys::gallery()), 2);
        assert!(cache.peek(&keys::gallery_image("g1")).unwrap().is_stale);
        assert!(!cache.peek(&keys::colleges()).unwrap().is_stale);
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_keeps_entry_stale() {
        let cache = QueryCache::new(CacheConfig::default());
        let (fetcher, _) = scripted(vec![Ok(json!("before-write"))]);
        let key = keys::programs();

        cache.get(&key, fetcher.clone(), fresh_for(60));
        cache.invalidate(&key);
        let entry = cache.fetch(&key, fetcher, fresh_for(60)).await;

        assert_eq!(entry.data, Some(json!("before-write")));
        assert!(entry.is_stale);
    }

    #[tokio::test]
    async fn test_loading_entry_keeps_data() {
        let cache = QueryCache::new(CacheConfig::default());
        let (fetcher, _) = scripted(vec![Ok(json!("v1")), Ok(json!("v2"))]);
        let key = keys::inquiries();

        cache.fetch(&key, fetcher.clone(), QueryOptions::default()).await;
        let loading = cache.get(&key, fetcher, QueryOptions::default());

        assert_eq!(loading.status, QueryStatus::Loading);
        assert_eq!(loading.data, Some(json!("v1")));
    }

    #[tokio::test]
    async fn test_disabled_query_does_not_fetch() {
        let cache = QueryCache::new(CacheConfig::default());
        let (fetcher, calls) = scripted(vec![Ok(json!(1))]);

        let entry = cache
            .fetch(&keys::college("c1"), fetcher, QueryOptions::disabled())
            .await;
        assert_eq!(entry.status, QueryStatus::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_goes_stale_after_max_age() {
        let cache = QueryCache::new(CacheConfig::default());
        let (fetcher, calls) = scripted(vec![Ok(json!(1)), Ok(json!(2))]);
        let key = keys::colleges();

        cache.fetch(&key, fetcher.clone(), fresh_for(10)).await;
        assert!(!cache.get(&key, fetcher.clone(), fresh_for(10)).is_fetching);

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(cache.peek(&key).unwrap().is_stale);
        cache.fetch(&key, fetcher, fresh_for(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = QueryCache::new(CacheConfig {
            max_entries: 2,
            ..Default::default()
        });
        let (fetcher, _) = scripted(vec![Ok(json!(1)), Ok(json!(2)), Ok(json!(3))]);

        cache.fetch(&keys::college("a"), fetcher.clone(), fresh_for(60)).await;
        cache.fetch(&keys::college("b"), fetcher.clone(), fresh_for(60)).await;
        // Touch "a" so "b" becomes least recently used
        cache.get(&keys::college("a"), fetcher.clone(), fresh_for(60));
        cache.fetch(&keys::college("c"), fetcher, fresh_for(60)).await;

        assert!(cache.peek(&keys::college("a")).is_some());
        assert!(cache.peek(&keys::college("b")).is_none());
        assert!(cache.peek(&keys::college("c")).is_some());
        assert_eq!(cache.stats().eviction_count, 1);
    }

    #[tokio::test]
    async fn test_in_flight_entry_not_evicted() {
        let cache = QueryCache::new(CacheConfig {
            max_entries: 1,
            ..Default::default()
        });
        let (fetcher, _) = scripted(vec![Ok(json!(1)), Ok(json!(2))]);

        cache.get(&keys::college("a"), fetcher.clone(), QueryOptions::default());
        cache.get(&keys::college("b"), fetcher, QueryOptions::default());

        assert_eq!(cache.len(), 2);
        assert!(cache.peek(&keys::college("a")).unwrap().is_fetching);
    }

    #[tokio::test]
    async fn test_events_published() {
        let cache = QueryCache::new(CacheConfig::default());
        let mut events = cache.subscribe();
        let (fetcher, _) = scripted(vec![Ok(json!(1))]);
        let key = keys::forms();

        cache.fetch(&key, fetcher, QueryOptions::default()).await;
        cache.invalidate(&key);

        assert_eq!(events.recv().await.unwrap(), CacheEvent::Fetching(key.clone()));
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Updated(key.clone()));
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Invalidated(key));
    }

    #[tokio::test]
    async fn test_typed_payload_round_trip() {
        #[derive(Serialize, serde::Deserialize, Debug, PartialEq)]
        struct Row {
            id: String,
        }

        let cache = QueryCache::new(CacheConfig::default());
        let entry = cache
            .fetch(
                &keys::inquiries(),
                || async { Ok::<_, ApiError>(vec![Row { id: "i1".into() }]) },
                QueryOptions::default(),
            )
            .await;

        let rows: Vec<Row> = entry.data_as().unwrap().unwrap();
        assert_eq!(rows, vec![Row { id: "i1".into() }]);
    }
}
