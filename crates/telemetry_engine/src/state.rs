//! Per-metric state registry with per-metric locking.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use contracts::{MetricId, MetricState};

/// Registry of per-metric runtime state.
///
/// One mutex per metric, so unrelated metrics never contend and a slow tick
/// for one metric cannot delay another's. The metric set is fixed at
/// construction; `cfg/set` cannot add or remove metrics.
#[derive(Debug, Clone)]
pub struct StateRegistry {
    inner: Arc<HashMap<MetricId, Mutex<MetricState>>>,
}

impl StateRegistry {
    /// Create a registry with unset state for each metric
    pub fn new(metrics: impl IntoIterator<Item = MetricId>) -> Self {
        let inner = metrics
            .into_iter()
            .map(|metric| (metric, Mutex::new(MetricState::default())))
            .collect();
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Run `f` against one metric's state under its lock
    pub fn with_state<R>(
        &self,
        metric: &str,
        f: impl FnOnce(&mut MetricState) -> R,
    ) -> Option<R> {
        let lock = self.inner.get(metric)?;
        let mut state = lock.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&mut state))
    }

    /// Clear every metric's state; the next sample of each seeds a fresh
    /// baseline. Returns how many metrics were cleared.
    pub fn reset_all(&self) -> usize {
        for lock in self.inner.values() {
            lock.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
        self.inner.len()
    }

    /// Ordered snapshot of all metric states (the retained `state` payload)
    pub fn snapshot(&self) -> BTreeMap<String, MetricState> {
        self.inner
            .iter()
            .map(|(metric, lock)| {
                let state = *lock.lock().unwrap_or_else(PoisonError::into_inner);
                (metric.to_string(), state)
            })
            .collect()
    }
}
