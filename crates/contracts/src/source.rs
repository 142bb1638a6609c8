//! MetricSampler trait - on-demand metric reading source
//!
//! Abstracts whatever produces the numeric readings: the real system
//! sampler, a mock wave generator, or a scripted sequence in tests. The
//! engine never learns how a reading is produced.

use crate::{ComponentError, MetricId};

/// Metric reading source trait
///
/// The call may be slow or fallible; it is treated as an external
/// collaborator with its own timeout policy. A failed sample skips the tick,
/// it never stops the scheduler.
#[trait_variant::make(MetricSampler: Send)]
pub trait LocalMetricSampler {
    /// Sampler name (used for logging)
    fn name(&self) -> &str;

    /// Produce a fresh reading for the named metric
    ///
    /// # Errors
    /// `ComponentError::UnknownMetric` for names the sampler does not serve,
    /// `ComponentError::Sampling` when a reading cannot be produced.
    async fn sample(&self, metric: &MetricId) -> Result<f64, ComponentError>;
}
