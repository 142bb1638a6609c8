//! Telemetry scheduler - one repeating sampling task per metric.
//!
//! Each worker re-reads its period from the live configuration on every
//! iteration, so `cfg/set` interval changes take effect on the next fire
//! without a restart. Workers are independent: a slow sampler call or a
//! failure on one metric never delays another's timer.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use contracts::{
    BusEvent, ConfigStore, EventSink, MetricId, MetricSampler, TelemetrySample, TopicScheme,
};
use log_batcher::LogBatcher;
use observability::{
    record_sampling_error, record_telemetry_published, record_telemetry_suppressed,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, trace, warn};

use crate::gate::{decide, GateDecision, SuppressReason};
use crate::state::StateRegistry;

/// Fallback period when a metric's config entry disappears mid-run
const ORPHAN_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Handle to all running metric workers
pub struct TelemetryScheduler {
    workers: Vec<(MetricId, JoinHandle<()>)>,
}

impl TelemetryScheduler {
    /// Spawn one worker per metric currently in the configuration
    pub fn spawn<S>(
        sampler: Arc<S>,
        config: ConfigStore,
        states: StateRegistry,
        events: EventSink,
        topics: TopicScheme,
        log: LogBatcher,
        shutdown: watch::Receiver<bool>,
    ) -> Self
    where
        S: MetricSampler + Sync + 'static,
    {
        let workers = config
            .metric_ids()
            .into_iter()
            .map(|metric| {
                let worker = MetricWorker {
                    topic: topics.telemetry(&metric),
                    metric: metric.clone(),
                    sampler: Arc::clone(&sampler),
                    config: config.clone(),
                    states: states.clone(),
                    events: events.clone(),
                    log: log.clone(),
                };
                let handle = tokio::spawn(worker.run(shutdown.clone()));
                (metric, handle)
            })
            .collect();

        Self { workers }
    }

    /// Number of running workers
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether any workers are running
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Wait for every worker to observe shutdown and finish
    pub async fn join(self) {
        for (metric, handle) in self.workers {
            if let Err(e) = handle.await {
                error!(metric = %metric, error = ?e, "Metric worker panicked");
            }
        }
    }
}

/// One metric's repeating sampling task
struct MetricWorker<S> {
    metric: MetricId,
    topic: String,
    sampler: Arc<S>,
    config: ConfigStore,
    states: StateRegistry,
    events: EventSink,
    log: LogBatcher,
}

impl<S> MetricWorker<S>
where
    S: MetricSampler + Sync + 'static,
{
    #[instrument(name = "metric_worker_loop", skip(self, shutdown), fields(metric = %self.metric))]
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        debug!(metric = %self.metric, "Metric worker started");

        loop {
            // Re-read the period every iteration; an interval change applies
            // from the next fire, the in-flight sleep completes at the old
            // boundary.
            let period = self.current_period();
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(period) => self.tick().await,
            }
        }

        debug!(metric = %self.metric, "Metric worker stopped");
    }

    fn current_period(&self) -> Duration {
        match self.config.metric_config(&self.metric) {
            Some(cfg) => {
                Duration::try_from_secs_f64(cfg.interval_s).unwrap_or(ORPHAN_POLL_INTERVAL)
            }
            None => ORPHAN_POLL_INTERVAL,
        }
    }

    async fn tick(&self) {
        // Whole-value snapshot under the read lock: a concurrent cfg/set
        // yields either the old config or the new one, never a mix.
        let Some(cfg) = self.config.metric_config(&self.metric) else {
            return;
        };

        if !cfg.enabled {
            // Skip without calling the sampler; disabled metrics cost nothing
            trace!(metric = %self.metric, "Metric disabled, tick skipped");
            record_telemetry_suppressed(&self.metric, "disabled");
            return;
        }

        let value = match self.sampler.sample(&self.metric).await {
            Ok(value) => value,
            Err(e) => {
                warn!(metric = %self.metric, error = %e, "Sample failed, tick skipped");
                record_sampling_error(&self.metric);
                self.log
                    .error(format!("sampling '{}' failed: {e}", self.metric));
                return;
            }
        };

        let now = Utc::now();
        let decision = self.states.with_state(&self.metric, |state| {
            let decision = decide(&cfg, state, value);
            match decision {
                GateDecision::Publish => state.record_published(value, now),
                GateDecision::Suppress(_) => state.record_suppressed(now),
            }
            decision
        });
        let Some(decision) = decision else {
            // Metric unknown to the registry; nothing to track
            return;
        };

        match decision {
            GateDecision::Publish => {
                let sample = TelemetrySample {
                    metric: self.metric.clone(),
                    value,
                    timestamp: now,
                };
                match BusEvent::serialize(&self.topic, &sample, false) {
                    Ok(event) => (self.events)(event),
                    Err(e) => {
                        error!(metric = %self.metric, error = %e, "Telemetry serialize failed")
                    }
                }
                record_telemetry_published(&self.metric);
                trace!(metric = %self.metric, value, "Telemetry published");
            }
            GateDecision::Suppress(SuppressReason::BelowThreshold { change_percent }) => {
                trace!(
                    metric = %self.metric,
                    value,
                    change_percent,
                    "Telemetry suppressed"
                );
                record_telemetry_suppressed(&self.metric, "below_threshold");
            }
            GateDecision::Suppress(SuppressReason::Disabled) => {
                record_telemetry_suppressed(&self.metric, "disabled");
            }
        }
    }
}
