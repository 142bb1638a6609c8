//! Command router - thin glue between the host command surface and state.
//!
//! Maps `reset` / `ping` / `cfg/set` onto state mutations; every command,
//! regardless of outcome, publishes exactly one `CommandResult` on
//! `evt/<action>/result`.

use contracts::{
    BusEvent, CommandRequest, CommandResult, ConfigStore, EventSink, TopicScheme,
};
use log_batcher::LogBatcher;
use observability::record_command;
use serde_json::{json, Value};
use telemetry_engine::StateRegistry;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::retained::RetainedPublisher;

/// Consumes command requests and applies them to component state
pub struct CommandRouter {
    config: ConfigStore,
    states: StateRegistry,
    retained: RetainedPublisher,
    topics: TopicScheme,
    events: EventSink,
    log: LogBatcher,
}

impl CommandRouter {
    /// Spawn the router task over a command channel
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        rx: mpsc::Receiver<CommandRequest>,
        config: ConfigStore,
        states: StateRegistry,
        retained: RetainedPublisher,
        topics: TopicScheme,
        events: EventSink,
        log: LogBatcher,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let router = Self {
            config,
            states,
            retained,
            topics,
            events,
            log,
        };
        tokio::spawn(router.run(rx, shutdown))
    }

    async fn run(
        self,
        mut rx: mpsc::Receiver<CommandRequest>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        debug!("Command router started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                maybe = rx.recv() => match maybe {
                    Some(request) => self.process(request),
                    None => break,
                },
            }
        }
        debug!("Command router stopped");
    }

    /// Handle one request and publish its single result event
    fn process(&self, request: CommandRequest) {
        let result = self.handle(&request);
        info!(
            action = %request.action,
            request_id = %request.request_id,
            success = result.success,
            "Command handled"
        );
        record_command(&request.action, result.success);

        let topic = self.topics.command_result(&request.action);
        match BusEvent::serialize(&topic, &result, false) {
            Ok(event) => (self.events)(event),
            Err(e) => error!(topic = %topic, error = %e, "Command result serialize failed"),
        }
    }

    fn handle(&self, request: &CommandRequest) -> CommandResult {
        match request.action.as_str() {
            "reset" => self.handle_reset(request),
            "ping" => CommandResult::ok(request, Value::Null),
            "cfg/set" => self.handle_cfg_set(request),
            other => {
                warn!(action = %other, "Unknown command action");
                CommandResult::failed(request, format!("unknown command action: {other}"))
            }
        }
    }

    /// `reset`: clear all metric state so the next sample of each metric
    /// seeds a fresh baseline, then republish the retained state snapshot.
    fn handle_reset(&self, request: &CommandRequest) -> CommandResult {
        let cleared = self.states.reset_all();
        self.log.info("metric state reset");
        self.retained.publish_state(&self.states.snapshot());
        CommandResult::ok(request, json!({ "cleared_metrics": cleared }))
    }

    /// `cfg/set`: validate the whole patch, then merge per-field and
    /// republish the retained cfg. A failing patch applies nothing.
    fn handle_cfg_set(&self, request: &CommandRequest) -> CommandResult {
        let Some(set) = request.payload.get("set") else {
            return CommandResult::failed(request, "payload 'set' must be an object");
        };

        let patch = match config_loader::parse_patch(set) {
            Ok(patch) => patch,
            Err(e) => return CommandResult::failed(request, e.to_string()),
        };
        if let Err(e) = config_loader::validate_patch(&patch) {
            return CommandResult::failed(request, e.to_string());
        }

        let (snapshot, ignored) = self.config.apply_patch(&patch);
        for metric in &ignored {
            warn!(metric = %metric, "Ignoring config patch for untracked metric");
        }

        self.retained.publish_cfg(&snapshot);
        self.log.info("configuration updated via cfg/set");
        CommandResult::ok(
            request,
            json!({ "applied": patch, "ignored_metrics": ignored }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ComponentConfig, LogBatchSettings};
    use std::sync::{Arc, Mutex};

    struct Harness {
        router: CommandRouter,
        config: ConfigStore,
        states: StateRegistry,
        captured: Arc<Mutex<Vec<BusEvent>>>,
    }

    fn harness() -> Harness {
        let config = ConfigStore::new(ComponentConfig::fixture_cpu());
        let states = StateRegistry::new(config.metric_ids());
        let topics = TopicScheme::new("t");

        let captured: Arc<Mutex<Vec<BusEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_captured = captured.clone();
        let events: EventSink = Arc::new(move |event| {
            sink_captured.lock().unwrap().push(event);
        });

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (log, _log_worker) = LogBatcher::spawn(
            LogBatchSettings::default(),
            config.clone(),
            events.clone(),
            topics.logs(),
            shutdown_rx,
        );

        let router = CommandRouter {
            config: config.clone(),
            states: states.clone(),
            retained: RetainedPublisher::new(events.clone(), topics.clone()),
            topics,
            events,
            log,
        };

        Harness {
            router,
            config,
            states,
            captured,
        }
    }

    fn request(action: &str, payload: Value) -> CommandRequest {
        let mut request = CommandRequest::with_payload(action, payload);
        request.request_id = "req-1".to_string();
        request
    }

    #[tokio::test]
    async fn test_ping_succeeds_without_state_change() {
        let h = harness();
        let before = h.config.snapshot();

        let result = h.router.handle(&request("ping", Value::Null));
        assert!(result.success);
        assert_eq!(result.request_id, "req-1");
        assert_eq!(h.config.snapshot(), before);
    }

    #[tokio::test]
    async fn test_unknown_action_fails() {
        let h = harness();
        let result = h.router.handle(&request("self_destruct", Value::Null));
        assert!(!result.success);
        assert_eq!(result.action, "self_destruct");
    }

    #[tokio::test]
    async fn test_reset_clears_states_and_republishes_state() {
        let h = harness();
        h.states.with_state("cpu_percent", |state| {
            state.record_published(42.0, chrono_now());
        });

        let result = h.router.handle(&request("reset", Value::Null));
        assert!(result.success);
        assert_eq!(result.detail["cleared_metrics"], 2);
        assert_eq!(h.states.snapshot()["cpu_percent"].last_value, None);

        // Retained state snapshot republished
        let state_events: Vec<_> = h
            .captured
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.topic == "t/state")
            .cloned()
            .collect();
        assert_eq!(state_events.len(), 1);
        assert!(state_events[0].retain);
    }

    #[tokio::test]
    async fn test_cfg_set_merges_and_republishes_cfg() {
        let h = harness();
        let result = h.router.handle(&request(
            "cfg/set",
            json!({"set": {"telemetry": {"metrics": {"load": {"interval_s": 0.5}}}}}),
        ));
        assert!(result.success, "detail: {}", result.detail);

        let snapshot = h.config.snapshot();
        assert_eq!(snapshot.telemetry.metrics["load"].interval_s, 0.5);
        // Untouched fields keep prior values
        assert!(snapshot.telemetry.metrics["load"].enabled);

        let cfg_events: Vec<_> = h
            .captured
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.topic == "t/cfg")
            .cloned()
            .collect();
        assert_eq!(cfg_events.len(), 1);
    }

    #[tokio::test]
    async fn test_cfg_set_missing_set_key_fails() {
        let h = harness();
        let result = h
            .router
            .handle(&request("cfg/set", json!({"logs_enabled": false})));
        assert!(!result.success);
        assert!(result
            .detail
            .as_str()
            .unwrap()
            .contains("'set' must be an object"));
    }

    #[tokio::test]
    async fn test_cfg_set_invalid_patch_applies_nothing() {
        let h = harness();
        let before = h.config.snapshot();

        // One valid field and one invalid field: nothing may merge
        let result = h.router.handle(&request(
            "cfg/set",
            json!({"set": {
                "logs_enabled": false,
                "telemetry": {"metrics": {"load": {"interval_s": -3.0}}}
            }}),
        ));
        assert!(!result.success);
        assert_eq!(h.config.snapshot(), before);
    }

    #[tokio::test]
    async fn test_cfg_set_unknown_metric_ignored_with_rest_applied() {
        let h = harness();
        let result = h.router.handle(&request(
            "cfg/set",
            json!({"set": {"telemetry": {"metrics": {
                "disk_io": {"enabled": true},
                "load": {"enabled": false}
            }}}}),
        ));
        assert!(result.success);
        assert_eq!(result.detail["ignored_metrics"], json!(["disk_io"]));

        let snapshot = h.config.snapshot();
        assert!(!snapshot.telemetry.metrics["load"].enabled);
        assert!(!snapshot.telemetry.metrics.contains_key("disk_io"));
    }

    #[tokio::test]
    async fn test_process_publishes_exactly_one_result() {
        let h = harness();
        h.router.process(request("ping", Value::Null));

        let results: Vec<_> = h
            .captured
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.topic == "t/evt/ping/result")
            .cloned()
            .collect();
        assert_eq!(results.len(), 1);
        let result: CommandResult = serde_json::from_value(results[0].payload.clone()).unwrap();
        assert!(result.success);
        assert_eq!(result.request_id, "req-1");
    }

    #[tokio::test]
    async fn test_cfg_set_result_topic_nests_action_path() {
        let h = harness();
        h.router
            .process(request("cfg/set", json!({"set": {"logs_enabled": true}})));

        let results = h
            .captured
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.topic == "t/evt/cfg/set/result")
            .count();
        assert_eq!(results, 1);
    }

    fn chrono_now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}
