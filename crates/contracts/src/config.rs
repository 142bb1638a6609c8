//! Host-mutable component configuration and its patch/merge semantics.
//!
//! `ComponentConfig` is the retained `cfg` document. It is replaced only
//! through `cfg/set` patches, which merge per-field: unspecified fields keep
//! their prior values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::MetricId;

/// Per-metric telemetry gating configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Emit telemetry events for this metric at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Sampling period in seconds (must be > 0)
    #[serde(default = "default_interval_s")]
    pub interval_s: f64,

    /// Minimum percent change against the last *published* value required to
    /// publish again (>= 0; 0 means publish every sample)
    #[serde(default = "default_change_threshold")]
    pub change_threshold_percent: f64,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_s: default_interval_s(),
            change_threshold_percent: default_change_threshold(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_s() -> f64 {
    2.0
}

fn default_change_threshold() -> f64 {
    2.0
}

/// Telemetry section of the component configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Gating configuration per tracked metric
    #[serde(default)]
    pub metrics: HashMap<MetricId, MetricConfig>,
}

/// Host-mutable component configuration (retained as `cfg`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Publish batched log records on the logs topic
    #[serde(default = "default_true")]
    pub logs_enabled: bool,

    /// Telemetry gating configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            logs_enabled: true,
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl ComponentConfig {
    /// Default configuration of the CPU fixture: `cpu_percent` and `load`,
    /// both enabled at 2 s / 2 %.
    pub fn fixture_cpu() -> Self {
        let mut metrics = HashMap::new();
        metrics.insert(MetricId::from("cpu_percent"), MetricConfig::default());
        metrics.insert(MetricId::from("load"), MetricConfig::default());
        Self {
            logs_enabled: true,
            telemetry: TelemetryConfig { metrics },
        }
    }

    /// Merge a patch into this configuration, per-field.
    ///
    /// Patch entries naming metrics that are not tracked are skipped (the
    /// tracked metric set is fixed at component start); the skipped names are
    /// returned so the caller can warn about them.
    pub fn merge_patch(&mut self, patch: &ConfigPatch) -> Vec<MetricId> {
        let mut skipped = Vec::new();

        if let Some(logs_enabled) = patch.logs_enabled {
            self.logs_enabled = logs_enabled;
        }

        if let Some(ref telemetry) = patch.telemetry {
            for (metric, metric_patch) in &telemetry.metrics {
                match self.telemetry.metrics.get_mut(metric.as_str()) {
                    Some(config) => config.merge(metric_patch),
                    None => skipped.push(metric.clone()),
                }
            }
        }

        skipped
    }
}

impl MetricConfig {
    /// Merge a per-metric patch, per-field
    pub fn merge(&mut self, patch: &MetricConfigPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(interval_s) = patch.interval_s {
            self.interval_s = interval_s;
        }
        if let Some(threshold) = patch.change_threshold_percent {
            self.change_threshold_percent = threshold;
        }
    }
}

/// Partial `ComponentConfig` supplied by `cfg/set`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<TelemetryPatch>,
}

/// Partial telemetry section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPatch {
    #[serde(default)]
    pub metrics: HashMap<MetricId, MetricConfigPatch>,
}

/// Partial per-metric configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_s: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_threshold_percent: Option<f64>,
}

/// Log batcher limits.
///
/// Part of the blueprint file, not mutable via `cfg/set` (only the
/// `logs_enabled` switch is host-mutable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogBatchSettings {
    /// Flush when the open batch reaches this many records
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Flush when the oldest buffered record reaches this age (seconds)
    #[serde(default = "default_max_batch_age_s")]
    pub max_batch_age_s: f64,

    /// Unpublished batches retained while logs are disabled; oldest dropped first
    #[serde(default = "default_max_retained_batches")]
    pub max_retained_batches: usize,
}

impl Default for LogBatchSettings {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            max_batch_age_s: default_max_batch_age_s(),
            max_retained_batches: default_max_retained_batches(),
        }
    }
}

impl LogBatchSettings {
    /// Maximum buffering age as a `Duration`
    pub fn max_batch_age(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_batch_age_s)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_max_batch_age_s()))
    }
}

fn default_max_batch_size() -> usize {
    32
}

fn default_max_batch_age_s() -> f64 {
    5.0
}

fn default_max_retained_batches() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_default_metrics() {
        let cfg = ComponentConfig::fixture_cpu();
        assert!(cfg.logs_enabled);
        assert!(cfg.telemetry.metrics.contains_key("cpu_percent"));
        assert!(cfg.telemetry.metrics.contains_key("load"));
    }

    #[test]
    fn test_merge_logs_enabled_only_leaves_metrics_unchanged() {
        let mut cfg = ComponentConfig::fixture_cpu();
        let before = cfg.telemetry.clone();

        let patch = ConfigPatch {
            logs_enabled: Some(false),
            telemetry: None,
        };
        let skipped = cfg.merge_patch(&patch);

        assert!(skipped.is_empty());
        assert!(!cfg.logs_enabled);
        assert_eq!(cfg.telemetry, before);
    }

    #[test]
    fn test_merge_is_per_field() {
        let mut cfg = ComponentConfig::fixture_cpu();

        let mut metrics = HashMap::new();
        metrics.insert(
            MetricId::from("cpu_percent"),
            MetricConfigPatch {
                interval_s: Some(0.5),
                ..Default::default()
            },
        );
        let patch = ConfigPatch {
            logs_enabled: None,
            telemetry: Some(TelemetryPatch { metrics }),
        };
        cfg.merge_patch(&patch);

        let cpu = &cfg.telemetry.metrics["cpu_percent"];
        assert_eq!(cpu.interval_s, 0.5);
        // Untouched fields keep prior values
        assert!(cpu.enabled);
        assert_eq!(cpu.change_threshold_percent, 2.0);
        // Other metrics untouched
        assert_eq!(cfg.telemetry.metrics["load"], MetricConfig::default());
    }

    #[test]
    fn test_merge_skips_unknown_metric() {
        let mut cfg = ComponentConfig::fixture_cpu();
        let before = cfg.clone();

        let mut metrics = HashMap::new();
        metrics.insert(
            MetricId::from("disk_io"),
            MetricConfigPatch {
                enabled: Some(true),
                ..Default::default()
            },
        );
        let patch = ConfigPatch {
            logs_enabled: None,
            telemetry: Some(TelemetryPatch { metrics }),
        };
        let skipped = cfg.merge_patch(&patch);

        assert_eq!(skipped, vec![MetricId::from("disk_io")]);
        assert_eq!(cfg, before);
    }

    #[test]
    fn test_patch_deserializes_partial_document() {
        let patch: ConfigPatch = serde_json::from_str(
            r#"{"telemetry": {"metrics": {"load": {"change_threshold_percent": 0.0}}}}"#,
        )
        .unwrap();

        assert!(patch.logs_enabled.is_none());
        let telemetry = patch.telemetry.unwrap();
        let load = &telemetry.metrics["load"];
        assert_eq!(load.change_threshold_percent, Some(0.0));
        assert!(load.enabled.is_none());
        assert!(load.interval_s.is_none());
    }
}
