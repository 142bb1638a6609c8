//! Mock sampler implementations
//!
//! Generate simulated readings without touching the host system. Used for
//! testing and development when real CPU numbers would make runs
//! non-deterministic.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use contracts::{ComponentError, MetricId, MetricSampler};

/// Mock sampler configuration
#[derive(Debug, Clone)]
pub struct MockSamplerConfig {
    /// Midpoint of the generated wave
    pub base: f64,
    /// Peak deviation from the midpoint
    pub amplitude: f64,
    /// Samples per full wave cycle
    pub samples_per_cycle: u64,
}

impl Default for MockSamplerConfig {
    fn default() -> Self {
        Self {
            base: 40.0,
            amplitude: 25.0,
            samples_per_cycle: 20,
        }
    }
}

/// Deterministic wave sampler
///
/// Produces a sine wave around `base`, the same for every metric name, so
/// demo runs show the gate alternating between publish and suppress without
/// any host dependency.
pub struct MockSampler {
    config: MockSamplerConfig,
    counter: AtomicU64,
}

impl MockSampler {
    /// Create a mock sampler with the given wave shape
    pub fn new(config: MockSamplerConfig) -> Self {
        Self {
            config,
            counter: AtomicU64::new(0),
        }
    }

    /// Create a mock sampler with the default wave shape
    pub fn with_defaults() -> Self {
        Self::new(MockSamplerConfig::default())
    }
}

impl MetricSampler for MockSampler {
    fn name(&self) -> &str {
        "mock"
    }

    async fn sample(&self, _metric: &MetricId) -> Result<f64, ComponentError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let phase = (n % self.config.samples_per_cycle) as f64
            / self.config.samples_per_cycle as f64;
        Ok(self.config.base + self.config.amplitude * (phase * std::f64::consts::TAU).sin())
    }
}

/// Scripted sampler for tests
///
/// Returns queued readings (or errors) per metric in order; once a metric's
/// script is exhausted the last successful value repeats, so a test can
/// script the interesting prefix and let the tail settle.
#[derive(Default)]
pub struct ScriptedSampler {
    scripts: Mutex<HashMap<MetricId, VecDeque<Result<f64, String>>>>,
    last_values: Mutex<HashMap<MetricId, f64>>,
    calls: AtomicU64,
}

impl ScriptedSampler {
    /// Create an empty scripted sampler
    pub fn new() -> Self {
        Self::default()
    }

    /// Append readings to one metric's script
    pub fn push_values(&self, metric: &str, values: impl IntoIterator<Item = f64>) {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        scripts
            .entry(MetricId::from(metric))
            .or_default()
            .extend(values.into_iter().map(Ok));
    }

    /// Append a sampling failure to one metric's script
    pub fn push_error(&self, metric: &str, message: &str) {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        scripts
            .entry(MetricId::from(metric))
            .or_default()
            .push_back(Err(message.to_string()));
    }

    /// Total number of `sample` calls across all metrics
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl MetricSampler for ScriptedSampler {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn sample(&self, metric: &MetricId) -> Result<f64, ComponentError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let next = {
            let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
            scripts.get_mut(metric.as_str()).and_then(VecDeque::pop_front)
        };

        match next {
            Some(Ok(value)) => {
                let mut last = self
                    .last_values
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                last.insert(metric.clone(), value);
                Ok(value)
            }
            Some(Err(message)) => Err(ComponentError::sampling(metric.as_str(), message)),
            None => {
                let last = self
                    .last_values
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                last.get(metric.as_str()).copied().ok_or_else(|| {
                    ComponentError::sampling(metric.as_str(), "script exhausted")
                })
            }
        }
    }
}
