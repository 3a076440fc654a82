//! Mutation coordinator

use super::{MutationId, MutationRecord, MutationStatus, MutationTarget};
use crate::cache::QueryCache;
use crate::config::MutationConfig;
use crate::error::{ApiError, Result};
use crate::keys::QueryKey;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Result of a coordinated write
#[derive(Debug)]
pub struct MutationOutcome<T> {
    pub id: MutationId,
    pub result: Result<T>,
}

impl<T> MutationOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T> {
        self.result
    }
}

/// Runs writes and reconciles the query cache with their outcome.
///
/// On success every affected key is invalidated; on failure nothing is, so
/// the cache keeps reflecting pre-write server state. Writes are not
/// applied optimistically and concurrent writes are not serialized;
/// invalidation is idempotent so overlapping writes need no ordering.
///
/// Settled records stay readable until acknowledged, reset, or pushed out
/// by newer ones past [`MutationConfig::max_records`].
///
/// # Example
///
/// ```rust,ignore
/// use campus_sdk::{keys, MutationTarget, Operation, ResourceKind};
///
/// let outcome = coordinator
///     .mutate(
///         MutationTarget::new(ResourceKind::College, Operation::Create),
///         [keys::colleges()],
///         client.create_college(&input),
///     )
///     .await;
///
/// if let Err(err) = &outcome.result {
///     notify(err.message.clone());
/// }
/// coordinator.acknowledge(outcome.id);
/// ```
#[derive(Clone)]
pub struct MutationCoordinator {
    cache: QueryCache,
    records: Arc<Mutex<HashMap<MutationId, MutationRecord>>>,
    next_id: Arc<AtomicU64>,
    max_records: usize,
}

impl MutationCoordinator {
    pub fn new(cache: QueryCache) -> Self {
        Self::with_config(cache, MutationConfig::default())
    }

    pub fn with_config(cache: QueryCache, config: MutationConfig) -> Self {
        Self {
            cache,
            records: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
            max_records: config.max_records,
        }
    }

    /// Execute `call` as a tracked write against `target`.
    ///
    /// Callers must not resubmit the same write while its record is pending.
    pub async fn mutate<T, Fut, I>(
        &self,
        target: MutationTarget,
        affected_keys: I,
        call: Fut,
    ) -> MutationOutcome<T>
    where
        Fut: Future<Output = Result<T>>,
        I: IntoIterator<Item = QueryKey>,
    {
        let id = MutationId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let affected: BTreeSet<QueryKey> = affected_keys.into_iter().collect();

        self.table().insert(
            id,
            MutationRecord {
                id,
                target,
                status: MutationStatus::Pending,
                error: None,
                affected_keys: affected.clone(),
            },
        );
        debug!(mutation = %id, target = %target, "Mutation pending");

        let result = call.await;

        match &result {
            Ok(_) => {
                self.settle(id, MutationStatus::Success, None);
                let staled: usize = affected.iter().map(|key| self.cache.invalidate(key)).sum();
                info!(
                    mutation = %id,
                    target = %target,
                    keys = affected.len(),
                    staled,
                    "Mutation succeeded"
                );
            }
            Err(err) => {
                warn!(mutation = %id, target = %target, error = %err, "Mutation failed");
                self.settle(id, MutationStatus::Error, Some(err.clone()));
            }
        }

        MutationOutcome { id, result }
    }

    /// Snapshot of a tracked record
    pub fn record(&self, id: MutationId) -> Option<MutationRecord> {
        self.table().get(&id).cloned()
    }

    /// Status of a mutation; `Idle` once it has been acknowledged or if the
    /// id is unknown
    pub fn status(&self, id: MutationId) -> MutationStatus {
        self.table()
            .get(&id)
            .map(|record| record.status)
            .unwrap_or(MutationStatus::Idle)
    }

    /// All tracked records, oldest first
    pub fn records(&self) -> Vec<MutationRecord> {
        let mut records: Vec<_> = self.table().values().cloned().collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// Whether any write to `target` is still in flight
    pub fn is_pending(&self, target: MutationTarget) -> bool {
        self.table()
            .values()
            .any(|record| record.target == target && record.is_pending())
    }

    /// Drop a settled record once its outcome has been shown.
    /// Pending records are kept and `None` is returned.
    pub fn acknowledge(&self, id: MutationId) -> Option<MutationRecord> {
        let mut records = self.table();
        match records.get(&id).map(MutationRecord::is_settled) {
            Some(true) => records.remove(&id),
            Some(false) => {
                debug!(mutation = %id, "Cannot acknowledge pending mutation");
                None
            }
            None => None,
        }
    }

    /// Drop every settled record
    pub fn reset(&self) {
        self.table().retain(|_, record| !record.is_settled());
    }

    fn settle(&self, id: MutationId, status: MutationStatus, error: Option<ApiError>) {
        let mut records = self.table();
        if let Some(record) = records.get_mut(&id) {
            record.status = status;
            record.error = error;
        }

        let mut settled: Vec<MutationId> = records
            .values()
            .filter(|record| record.is_settled())
            .map(|record| record.id)
            .collect();
        if settled.len() > self.max_records {
            settled.sort();
            let excess = settled.len() - self.max_records;
            for old in &settled[..excess] {
                records.remove(old);
            }
            debug!(pruned = excess, "Pruned settled mutation records");
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<MutationId, MutationRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
