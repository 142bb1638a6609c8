//! Blueprint and patch validation.
//!
//! Rules:
//! - component id / base_topic non-empty
//! - interval_s > 0 and finite
//! - change_threshold_percent >= 0 and finite
//! - log batch limits positive
//! - publisher names unique, file publishers carry a `path` param

use std::collections::HashSet;

use contracts::{
    ComponentBlueprint, ComponentError, ConfigPatch, MetricConfig, PublisherType,
};

/// Validate a full blueprint.
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &ComponentBlueprint) -> Result<(), ComponentError> {
    validate_identity(blueprint)?;
    validate_metrics(blueprint)?;
    validate_log_settings(blueprint)?;
    validate_publishers(blueprint)?;
    Ok(())
}

fn validate_identity(blueprint: &ComponentBlueprint) -> Result<(), ComponentError> {
    if blueprint.component.id.is_empty() {
        return Err(ComponentError::config_validation(
            "component.id",
            "component id cannot be empty",
        ));
    }
    if blueprint.component.base_topic.is_empty() {
        return Err(ComponentError::config_validation(
            "component.base_topic",
            "base topic cannot be empty",
        ));
    }
    Ok(())
}

fn validate_metrics(blueprint: &ComponentBlueprint) -> Result<(), ComponentError> {
    if blueprint.cfg.telemetry.metrics.is_empty() {
        return Err(ComponentError::config_validation(
            "cfg.telemetry.metrics",
            "at least one metric must be configured",
        ));
    }
    for (metric, config) in &blueprint.cfg.telemetry.metrics {
        validate_metric_config(metric.as_str(), config)?;
    }
    Ok(())
}

/// Validate one metric's gating configuration
fn validate_metric_config(metric: &str, config: &MetricConfig) -> Result<(), ComponentError> {
    if !(config.interval_s.is_finite() && config.interval_s > 0.0) {
        return Err(ComponentError::config_validation(
            format!("telemetry.metrics[{metric}].interval_s"),
            format!("interval_s must be > 0, got {}", config.interval_s),
        ));
    }
    if !(config.change_threshold_percent.is_finite() && config.change_threshold_percent >= 0.0) {
        return Err(ComponentError::config_validation(
            format!("telemetry.metrics[{metric}].change_threshold_percent"),
            format!(
                "change_threshold_percent must be >= 0, got {}",
                config.change_threshold_percent
            ),
        ));
    }
    Ok(())
}

fn validate_log_settings(blueprint: &ComponentBlueprint) -> Result<(), ComponentError> {
    let logs = &blueprint.logs;
    if logs.max_batch_size == 0 {
        return Err(ComponentError::config_validation(
            "logs.max_batch_size",
            "max_batch_size must be > 0",
        ));
    }
    if !(logs.max_batch_age_s.is_finite() && logs.max_batch_age_s > 0.0) {
        return Err(ComponentError::config_validation(
            "logs.max_batch_age_s",
            format!("max_batch_age_s must be > 0, got {}", logs.max_batch_age_s),
        ));
    }
    Ok(())
}

fn validate_publishers(blueprint: &ComponentBlueprint) -> Result<(), ComponentError> {
    let mut seen = HashSet::new();
    for (idx, publisher) in blueprint.publishers.iter().enumerate() {
        if publisher.name.is_empty() {
            return Err(ComponentError::config_validation(
                format!("publishers[{idx}].name"),
                "publisher name cannot be empty",
            ));
        }
        if !seen.insert(&publisher.name) {
            return Err(ComponentError::config_validation(
                format!("publishers[name={}]", publisher.name),
                "duplicate publisher name",
            ));
        }
        if publisher.publisher_type == PublisherType::File
            && !publisher.params.contains_key("path")
        {
            return Err(ComponentError::config_validation(
                format!("publishers[name={}].params.path", publisher.name),
                "file publisher requires a 'path' param",
            ));
        }
        if publisher.queue_capacity == 0 {
            return Err(ComponentError::config_validation(
                format!("publishers[name={}].queue_capacity", publisher.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}

/// Validate a `cfg/set` patch before any merge.
///
/// A failing patch is rejected whole; no partial merge is applied.
pub fn validate_patch(patch: &ConfigPatch) -> Result<(), ComponentError> {
    let Some(ref telemetry) = patch.telemetry else {
        return Ok(());
    };
    for (metric, metric_patch) in &telemetry.metrics {
        if let Some(interval_s) = metric_patch.interval_s {
            if !(interval_s.is_finite() && interval_s > 0.0) {
                return Err(ComponentError::config_validation(
                    format!("telemetry.metrics[{metric}].interval_s"),
                    format!("interval_s must be > 0, got {interval_s}"),
                ));
            }
        }
        if let Some(threshold) = metric_patch.change_threshold_percent {
            if !(threshold.is_finite() && threshold >= 0.0) {
                return Err(ComponentError::config_validation(
                    format!("telemetry.metrics[{metric}].change_threshold_percent"),
                    format!("change_threshold_percent must be >= 0, got {threshold}"),
                ));
            }
        }
    }
    Ok(())
}
