//! Query entry snapshots

use crate::error::ApiError;
use crate::keys::QueryKey;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Lifecycle state of a cached query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryStatus {
    /// Referenced but never fetched
    Idle,
    /// A fetch is in flight; the last known data is still served
    Loading,
    Success,
    /// The most recent fetch failed; the last good data is still served
    Error,
}

/// Per-call options for [`super::QueryCache::get`]
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// Overrides the cache-wide max age for this key
    pub max_age: Option<Duration>,
    /// When false the entry is returned without scheduling a fetch
    pub enabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_age: None,
            enabled: true,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Options that only read what is cached
    pub fn disabled() -> Self {
        Self::default().enabled(false)
    }
}

/// Snapshot of one cache entry at the time it was read
#[derive(Debug, Clone)]
pub struct QueryEntry {
    pub key: QueryKey,
    pub data: Option<serde_json::Value>,
    pub status: QueryStatus,
    pub error: Option<ApiError>,
    pub fetched_at: Option<Instant>,
    pub is_stale: bool,
    /// A fetch for this key is in flight
    pub is_fetching: bool,
}

impl QueryEntry {
    pub(crate) fn idle(key: QueryKey) -> Self {
        Self {
            key,
            data: None,
            status: QueryStatus::Idle,
            error: None,
            fetched_at: None,
            is_stale: true,
            is_fetching: false,
        }
    }

    /// Decode the cached payload into a typed value
    pub fn data_as<T: DeserializeOwned>(&self) -> serde_json::Result<Option<T>> {
        self.data
            .as_ref()
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// True until the first fetch has produced data or an error
    pub fn is_initial_load(&self) -> bool {
        self.data.is_none() && matches!(self.status, QueryStatus::Idle | QueryStatus::Loading)
    }
}

/// Staleness as a pure function of fetch time, max age and invalidation
pub(crate) fn is_stale(
    fetched_at: Option<Instant>,
    max_age: Duration,
    invalidated: bool,
    now: Instant,
) -> bool {
    if invalidated {
        return true;
    }
    match fetched_at {
        Some(at) => now.saturating_duration_since(at) >= max_age,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_staleness_by_age() {
        let fetched = Instant::now();
        let max_age = Duration::from_secs(10);

        assert!(!is_stale(Some(fetched), max_age, false, Instant::now()));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(is_stale(Some(fetched), max_age, false, Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidated_or_unfetched_is_stale() {
        let now = Instant::now();
        assert!(is_stale(None, Duration::from_secs(60), false, now));
        assert!(is_stale(Some(now), Duration::from_secs(60), true, now));
    }

    #[test]
    fn test_data_as() {
        let mut entry = QueryEntry::idle(QueryKey::new("colleges"));
        assert_eq!(entry.data_as::<Vec<String>>().unwrap(), None);

        entry.data = Some(serde_json::json!(["a", "b"]));
        assert_eq!(
            entry.data_as::<Vec<String>>().unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert!(entry.data_as::<u32>().is_err());
    }
}
