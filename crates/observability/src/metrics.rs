//! Metric recording helpers for the gate, batcher and dispatcher.
//!
//! Thin wrappers over the `metrics` facade so call sites stay one-liners and
//! metric names live in one place.

use metrics::counter;

/// Record one published telemetry sample
pub fn record_telemetry_published(metric: &str) {
    counter!(
        "procsim_telemetry_published_total",
        "metric" => metric.to_string()
    )
    .increment(1);
}

/// Record one suppressed telemetry sample
///
/// `reason` is `disabled` or `below_threshold`.
pub fn record_telemetry_suppressed(metric: &str, reason: &str) {
    counter!(
        "procsim_telemetry_suppressed_total",
        "metric" => metric.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a failed sample (tick skipped)
pub fn record_sampling_error(metric: &str) {
    counter!(
        "procsim_sampling_errors_total",
        "metric" => metric.to_string()
    )
    .increment(1);
}

/// Record one event handed to a publisher
pub fn record_event_published(publisher: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "procsim_events_published_total",
        "publisher" => publisher.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record an event dropped because a publisher queue was full
pub fn record_event_dropped(publisher: &str) {
    counter!(
        "procsim_events_dropped_total",
        "publisher" => publisher.to_string()
    )
    .increment(1);
}

/// Record a published log batch
pub fn record_log_batch_flushed(record_count: usize) {
    counter!("procsim_log_batches_flushed_total").increment(1);
    counter!("procsim_log_records_flushed_total").increment(record_count as u64);
}

/// Record a batch retained unpublished because logs are disabled
pub fn record_log_batch_discarded(record_count: usize) {
    counter!("procsim_log_batches_discarded_total").increment(1);
    counter!("procsim_log_records_discarded_total").increment(record_count as u64);
}

/// Record one handled command
pub fn record_command(action: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "procsim_commands_total",
        "action" => action.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
