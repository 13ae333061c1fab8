use crate::cli::PolicyArgs;
use metrics_exporter_prometheus::PrometheusHandle;
use mvr_screen::error::AppError;
use mvr_screen::screening::{
    PolicyEngine, PolicyThresholds, RepositoryError, ScreeningId, ScreeningRecord,
    ScreeningRepository,
};
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

const DEFAULT_SCREENING_CAPACITY: usize = 1_024;

/// Bounded audit log kept in memory; the oldest screening is evicted once it is full.
#[derive(Clone)]
pub(crate) struct InMemoryScreeningRepository {
    records: Arc<Mutex<VecDeque<ScreeningRecord>>>,
    capacity: usize,
}

impl InMemoryScreeningRepository {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<ScreeningRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl Default for InMemoryScreeningRepository {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SCREENING_CAPACITY)
    }
}

impl ScreeningRepository for InMemoryScreeningRepository {
    fn insert(&self, record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        if guard.len() == self.capacity {
            guard.pop_front();
        }
        guard.push_back(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ScreeningId) -> Result<Option<ScreeningRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.iter().find(|record| record.id == *id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<ScreeningRecord>, RepositoryError> {
        let guard = self.lock()?;
        let mut newest: Vec<&ScreeningRecord> = guard.iter().collect();
        newest.sort_by(|a, b| {
            b.received_at
                .cmp(&a.received_at)
                .then_with(|| b.id.sequence().cmp(&a.id.sequence()))
        });
        Ok(newest.into_iter().take(limit).cloned().collect())
    }
}

/// Applies command line overrides on top of the configured thresholds.
pub(crate) fn resolve_thresholds(
    base: PolicyThresholds,
    overrides: PolicyArgs,
) -> PolicyThresholds {
    PolicyThresholds {
        accident_threshold: overrides
            .accident_threshold
            .unwrap_or(base.accident_threshold),
        uninspected_vehicle_threshold: overrides
            .uninspected_threshold
            .unwrap_or(base.uninspected_vehicle_threshold),
    }
}

pub(crate) fn policy_engine(thresholds: &PolicyThresholds) -> Result<PolicyEngine, AppError> {
    Ok(PolicyEngine::standard(thresholds)?)
}
