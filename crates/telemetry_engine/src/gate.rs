//! Change/threshold gate - the per-tick publish decision.

use contracts::{MetricConfig, MetricState};

/// Denominator floor for percent change against a zero baseline
const EPSILON: f64 = 1e-9;

/// Gate decision for one sampled value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Emit the sample and advance the published baseline
    Publish,
    /// Swallow the sample; only `last_sampled_at` advances
    Suppress(SuppressReason),
}

/// Why a sample was suppressed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuppressReason {
    /// Metric is disabled in configuration
    Disabled,
    /// Change against the last published value is below the threshold
    BelowThreshold { change_percent: f64 },
}

/// Percent change of `current` against the published baseline `last`.
///
/// The denominator is floored at a small epsilon so a zero baseline cannot
/// divide by zero; a transition from 0 to any nonzero value therefore lands
/// far above any reasonable threshold and always publishes.
pub fn percent_change(last: f64, current: f64) -> f64 {
    (current - last).abs() / last.abs().max(EPSILON) * 100.0
}

/// Decide whether a sampled value publishes.
///
/// Rules, in order:
/// 1. a disabled metric never publishes
/// 2. a metric with no published baseline always publishes (seeding)
/// 3. otherwise the percent change against the last *published* value must
///    meet or exceed the configured threshold; a threshold of 0 publishes
///    every sample
pub fn decide(config: &MetricConfig, state: &MetricState, current_value: f64) -> GateDecision {
    if !config.enabled {
        return GateDecision::Suppress(SuppressReason::Disabled);
    }

    let (Some(last_value), Some(_)) = (state.last_value, state.last_published_at) else {
        return GateDecision::Publish;
    };

    let change = percent_change(last_value, current_value);
    if change >= config.change_threshold_percent {
        GateDecision::Publish
    } else {
        GateDecision::Suppress(SuppressReason::BelowThreshold {
            change_percent: change,
        })
    }
}
