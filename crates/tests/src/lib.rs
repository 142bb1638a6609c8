//! # Integration Tests
//!
//! End-to-end tests over the full component:
//! scripted sampler -> telemetry engine / log batcher -> dispatcher ->
//! memory publisher, driven on paused tokio time.

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use component::{ComponentHandle, FixtureComponent};
    use contracts::{
        CommandRequest, CommandResult, ComponentConfig, ComponentIdentity, LogBatch,
        LogBatchSettings, MetricConfig, MetricId, TelemetryConfig,
    };
    use dispatcher::publishers::{CapturedEvents, MemoryPublisher};
    use dispatcher::{DispatcherWorkers, EventDispatcher};
    use sampler::ScriptedSampler;
    use serde_json::json;

    const BASE: &str = "procsim/agents/test/fixture_cpu";

    struct Fixture {
        sampler: Arc<ScriptedSampler>,
        handle: ComponentHandle,
        captured: CapturedEvents,
        dispatcher: EventDispatcher,
        workers: DispatcherWorkers,
    }

    impl Fixture {
        /// Build a component over a scripted sampler and a memory publisher
        fn start(config: ComponentConfig, logs: LogBatchSettings) -> Self {
            let publisher = MemoryPublisher::new("memory");
            let captured = publisher.events();
            let (dispatcher, workers) = EventDispatcher::single(publisher, 1000);

            let component = FixtureComponent::new(
                ComponentIdentity {
                    id: "fixture_cpu".into(),
                    base_topic: "procsim/agents/test".into(),
                    description: "CPU fixture".into(),
                },
                config,
                logs,
                ScriptedSampler::new(),
                dispatcher.sink(),
            );
            let sampler = component.sampler();
            let handle = component.start();

            Self {
                sampler,
                handle,
                captured,
                dispatcher,
                workers,
            }
        }

        /// Shut everything down and wait for the publisher to drain
        async fn stop(self) -> CapturedEvents {
            self.handle.shutdown().await;
            drop(self.dispatcher);
            self.workers.join().await;
            self.captured
        }

        fn telemetry_values(&self, metric: &str) -> Vec<f64> {
            telemetry_values(&self.captured, metric)
        }

        async fn send(&self, action: &str, payload: serde_json::Value) {
            let mut request = CommandRequest::with_payload(action, payload);
            request.request_id = format!("req-{action}");
            self.handle.send_command(request).await.unwrap();
            // Let the router process while virtual time barely advances
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        fn last_result(&self, action: &str) -> CommandResult {
            let event = self
                .captured
                .last_on_topic(&format!("{BASE}/evt/{action}/result"))
                .unwrap_or_else(|| panic!("no result for '{action}'"));
            serde_json::from_value(event.payload).unwrap()
        }
    }

    fn telemetry_values(captured: &CapturedEvents, metric: &str) -> Vec<f64> {
        captured
            .on_topic(&format!("{BASE}/telemetry/{metric}"))
            .iter()
            .map(|event| event.payload["value"].as_f64().unwrap())
            .collect()
    }

    fn config_with(metrics: &[(&str, MetricConfig)], logs_enabled: bool) -> ComponentConfig {
        let mut map = HashMap::new();
        for (metric, config) in metrics {
            map.insert(MetricId::from(*metric), config.clone());
        }
        ComponentConfig {
            logs_enabled,
            telemetry: TelemetryConfig { metrics: map },
        }
    }

    fn metric(enabled: bool, interval_s: f64, threshold: f64) -> MetricConfig {
        MetricConfig {
            enabled,
            interval_s,
            change_threshold_percent: threshold,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_gated_telemetry_end_to_end() {
        let fixture = Fixture::start(
            config_with(
                &[
                    ("cpu_percent", metric(true, 1.0, 10.0)),
                    ("load", metric(false, 1.0, 0.0)),
                ],
                true,
            ),
            LogBatchSettings::default(),
        );
        fixture
            .sampler
            .push_values("cpu_percent", [100.0, 109.0, 110.0, 111.0, 150.0]);

        tokio::time::sleep(Duration::from_millis(5500)).await;
        let captured = fixture.stop().await;

        // 100 seeds; 109 is 9% off the 100 baseline (suppressed); 110 meets
        // the 10% threshold; 111 is under 1% off the new 110 baseline; 150
        // is 36% off and publishes.
        assert_eq!(
            telemetry_values(&captured, "cpu_percent"),
            vec![100.0, 110.0, 150.0]
        );
        // The disabled metric emitted nothing and was never sampled
        assert!(telemetry_values(&captured, "load").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_sample_after_reset_publishes() {
        let fixture = Fixture::start(
            config_with(&[("cpu_percent", metric(true, 1.0, 5.0))], true),
            LogBatchSettings::default(),
        );
        fixture.sampler.push_values("cpu_percent", [100.0]);

        // Three ticks on a flat value: only the seed publishes
        tokio::time::sleep(Duration::from_millis(3200)).await;
        assert_eq!(fixture.telemetry_values("cpu_percent").len(), 1);

        fixture.send("reset", serde_json::Value::Null).await;
        let result = fixture.last_result("reset");
        assert!(result.success);
        assert_eq!(result.detail["cleared_metrics"], 1);

        // Next tick re-seeds even though the value is unchanged
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(
            fixture.telemetry_values("cpu_percent"),
            vec![100.0, 100.0]
        );

        fixture.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ping_and_unknown_command_results() {
        let fixture = Fixture::start(
            config_with(&[("cpu_percent", metric(true, 60.0, 0.0))], true),
            LogBatchSettings::default(),
        );

        fixture.send("ping", serde_json::Value::Null).await;
        let ping = fixture.last_result("ping");
        assert!(ping.success);
        assert_eq!(ping.request_id, "req-ping");

        fixture.send("self_destruct", serde_json::Value::Null).await;
        let unknown = fixture.last_result("self_destruct");
        assert!(!unknown.success);

        fixture.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cfg_set_logs_only_preserves_metric_configs() {
        let initial_cpu = metric(true, 2.0, 3.0);
        let fixture = Fixture::start(
            config_with(&[("cpu_percent", initial_cpu.clone())], true),
            LogBatchSettings::default(),
        );

        fixture
            .send("cfg/set", json!({"set": {"logs_enabled": false}}))
            .await;
        assert!(fixture.last_result("cfg/set").success);

        let snapshot = fixture.handle.config_snapshot();
        assert!(!snapshot.logs_enabled);
        assert_eq!(snapshot.telemetry.metrics["cpu_percent"], initial_cpu);

        // Retained cfg was republished with the new value
        let cfg = fixture
            .captured
            .last_on_topic(&format!("{BASE}/cfg"))
            .unwrap();
        assert!(cfg.retain);
        assert_eq!(cfg.payload["logs_enabled"], false);

        fixture.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cfg_set_gating_change_takes_effect() {
        let fixture = Fixture::start(
            config_with(&[("cpu_percent", metric(true, 1.0, 50.0))], true),
            LogBatchSettings::default(),
        );
        fixture
            .sampler
            .push_values("cpu_percent", [100.0, 101.0, 102.0, 103.0]);

        // At 50% threshold only the seed publishes
        tokio::time::sleep(Duration::from_millis(2200)).await;
        assert_eq!(fixture.telemetry_values("cpu_percent").len(), 1);

        // Drop the threshold to 0: every subsequent sample publishes
        fixture
            .send(
                "cfg/set",
                json!({"set": {"telemetry": {"metrics": {
                    "cpu_percent": {"change_threshold_percent": 0.0}
                }}}}),
            )
            .await;
        assert!(fixture.last_result("cfg/set").success);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(
            fixture.telemetry_values("cpu_percent"),
            vec![100.0, 102.0, 103.0]
        );

        fixture.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_component_logs_stream_in_batches() {
        let fixture = Fixture::start(
            config_with(&[("cpu_percent", metric(true, 60.0, 0.0))], true),
            LogBatchSettings {
                max_batch_size: 3,
                max_batch_age_s: 30.0,
                max_retained_batches: 4,
            },
        );

        // The component already logged its startup record; two more fill
        // the batch.
        let logger = fixture.handle.logger();
        logger.info("first");
        logger.warn("second");
        tokio::time::sleep(Duration::from_millis(10)).await;

        let captured = fixture.stop().await;
        let log_events = captured.on_topic(&format!("{BASE}/logs"));
        assert_eq!(log_events.len(), 1);

        let batch: LogBatch = serde_json::from_value(log_events[0].payload.clone()).unwrap();
        assert_eq!(batch.batch_seq, 0);
        assert_eq!(batch.records.len(), 3);
        assert!(batch.records[0].message.contains("started"));
        assert_eq!(batch.records[1].message, "first");
        assert_eq!(batch.records[2].message, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_logs_never_publish_and_never_replay() {
        let fixture = Fixture::start(
            config_with(&[("cpu_percent", metric(true, 60.0, 0.0))], false),
            LogBatchSettings {
                max_batch_size: 2,
                max_batch_age_s: 30.0,
                max_retained_batches: 4,
            },
        );

        // Startup record + one more close a batch while logs are disabled
        let logger = fixture.handle.logger();
        logger.info("while disabled");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(fixture
            .captured
            .on_topic(&format!("{BASE}/logs"))
            .is_empty());

        // Enable logs; previously discarded batches must not appear. The
        // cfg/set handler logs one record of its own, which opens the first
        // published batch.
        fixture
            .send("cfg/set", json!({"set": {"logs_enabled": true}}))
            .await;

        logger.info("after enable 1");
        logger.info("after enable 2");
        tokio::time::sleep(Duration::from_millis(10)).await;

        let captured = fixture.stop().await;
        let log_events = captured.on_topic(&format!("{BASE}/logs"));
        assert_eq!(log_events.len(), 2);

        let first: LogBatch = serde_json::from_value(log_events[0].payload.clone()).unwrap();
        assert_eq!(first.batch_seq, 0);
        assert!(first.records[0].message.contains("configuration updated"));
        assert_eq!(first.records[1].message, "after enable 1");

        // "after enable 2" rode the best-effort shutdown flush
        let second: LogBatch = serde_json::from_value(log_events[1].payload.clone()).unwrap();
        assert_eq!(second.batch_seq, 1);
        assert_eq!(second.records[0].message, "after enable 2");
        // Nothing from the disabled period ever published
        for event in &log_events {
            let batch: LogBatch = serde_json::from_value(event.payload.clone()).unwrap();
            assert!(batch
                .records
                .iter()
                .all(|record| record.message != "while disabled"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_cfg_set_with_running_scheduler() {
        let fixture = Fixture::start(
            config_with(&[("cpu_percent", metric(true, 1.0, 0.0))], true),
            LogBatchSettings::default(),
        );
        fixture
            .sampler
            .push_values("cpu_percent", (0..40).map(f64::from));

        // Hammer cfg/set between ticks; every patch must apply atomically
        for i in 0..10 {
            let flipped = i % 2 == 0;
            fixture
                .send(
                    "cfg/set",
                    json!({"set": {"telemetry": {"metrics": {"cpu_percent": {
                        "interval_s": if flipped { 1.0 } else { 2.0 },
                        "change_threshold_percent": if flipped { 0.0 } else { 5.0 }
                    }}}}}),
                )
                .await;
            assert!(fixture.last_result("cfg/set").success);
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        let snapshot = fixture.handle.config_snapshot();
        let cpu = &snapshot.telemetry.metrics["cpu_percent"];
        // Final generation: i=9 wrote (2.0, 5.0)
        assert_eq!(cpu.interval_s, 2.0);
        assert_eq!(cpu.change_threshold_percent, 5.0);

        fixture.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_blueprint_driven_component() {
        let toml = r#"
[component]
id = "fixture_cpu"
base_topic = "lab/agents/a1"

[cfg.telemetry.metrics.cpu_percent]
enabled = true
interval_s = 1.0
change_threshold_percent = 0.0

[logs]
max_batch_size = 8
max_batch_age_s = 2.0
"#;
        let blueprint =
            config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
                .unwrap();

        let publisher = MemoryPublisher::new("memory");
        let captured = publisher.events();
        let (dispatcher, workers) = EventDispatcher::single(publisher, 1000);

        let component =
            FixtureComponent::from_blueprint(&blueprint, ScriptedSampler::new(), dispatcher.sink());
        let sampler = component.sampler();
        sampler.push_values("cpu_percent", [7.0]);

        let handle = component.start();
        tokio::time::sleep(Duration::from_millis(1200)).await;
        handle.shutdown().await;
        drop(dispatcher);
        workers.join().await;

        // Topics are rooted under the blueprint's base topic
        let telemetry = captured.on_topic("lab/agents/a1/fixture_cpu/telemetry/cpu_percent");
        assert_eq!(telemetry.len(), 1);
        assert_eq!(telemetry[0].payload["metric"], "cpu_percent");
        assert_eq!(telemetry[0].payload["value"], 7.0);
        assert!(!captured
            .on_topic("lab/agents/a1/fixture_cpu/metadata")
            .is_empty());
    }
}
