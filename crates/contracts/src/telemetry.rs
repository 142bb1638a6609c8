//! Telemetry wire payload and per-metric runtime state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MetricId;

/// A published telemetry reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Metric name
    pub metric: MetricId,

    /// Sampled value
    pub value: f64,

    /// Sample time
    pub timestamp: DateTime<Utc>,
}

/// Mutable per-metric bookkeeping behind the gate.
///
/// `last_value` / `last_published_at` track the last *published* sample, not
/// the last sampled one, so the change-threshold check accumulates drift
/// across consecutive suppressed samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricState {
    /// Value of the last published sample
    pub last_value: Option<f64>,

    /// Time of the last published sample
    pub last_published_at: Option<DateTime<Utc>>,

    /// Time of the last sample, published or not
    pub last_sampled_at: Option<DateTime<Utc>>,
}

impl MetricState {
    /// Clear all bookkeeping; the next sample seeds a fresh baseline
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Record a published sample
    pub fn record_published(&mut self, value: f64, at: DateTime<Utc>) {
        self.last_value = Some(value);
        self.last_published_at = Some(at);
        self.last_sampled_at = Some(at);
    }

    /// Record a suppressed sample
    pub fn record_suppressed(&mut self, at: DateTime<Utc>) {
        self.last_sampled_at = Some(at);
    }
}
