//! Shared runtime configuration store.
//!
//! `ConfigStore` is the single live copy of the host-mutable configuration,
//! read by every scheduler tick and the log batcher, written only by the
//! command path.

use std::sync::{Arc, PoisonError, RwLock};

use crate::{ComponentConfig, ConfigPatch, MetricConfig, MetricId};

/// Thread-safe view of the live `ComponentConfig`.
///
/// Readers clone whole values out under the read lock, so a concurrent
/// `cfg/set` can never produce a torn `MetricConfig` (half old, half new
/// fields). No lock is ever held across an await point.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<ComponentConfig>>,
}

impl ConfigStore {
    /// Create a store with the given initial configuration
    pub fn new(config: ComponentConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Clone the full current configuration
    pub fn snapshot(&self) -> ComponentConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically clone one metric's configuration
    pub fn metric_config(&self, metric: &str) -> Option<MetricConfig> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .telemetry
            .metrics
            .get(metric)
            .cloned()
    }

    /// Names of all tracked metrics
    pub fn metric_ids(&self) -> Vec<MetricId> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .telemetry
            .metrics
            .keys()
            .cloned()
            .collect()
    }

    /// Whether log batches publish or are discarded
    pub fn logs_enabled(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .logs_enabled
    }

    /// Merge a validated patch under the write lock.
    ///
    /// Returns the post-merge snapshot and the unknown metric names the merge
    /// skipped. The merge is all-or-nothing per call: validation happens
    /// before this method is reached.
    pub fn apply_patch(&self, patch: &ConfigPatch) -> (ComponentConfig, Vec<MetricId>) {
        let mut config = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let skipped = config.merge_patch(patch);
        (config.clone(), skipped)
    }
}
