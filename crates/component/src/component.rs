//! FixtureComponent - lifecycle and wiring.
//!
//! `start` publishes the retained snapshots, then spawns the per-metric
//! telemetry workers, the log batch worker and the command router; the
//! returned handle owns the shutdown signal and the command channel.

use std::collections::BTreeMap;
use std::sync::Arc;

use contracts::{
    CommandRequest, ComponentBlueprint, ComponentConfig, ComponentError, ComponentIdentity,
    ComponentMetadata, ComponentStatus, ConfigStore, EventSink, LogBatchSettings, MetricSampler,
    MetricState, TopicScheme,
};
use log_batcher::LogBatcher;
use telemetry_engine::{StateRegistry, TelemetryScheduler};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::command::CommandRouter;
use crate::retained::RetainedPublisher;

/// Pending host commands beyond this are rejected at the channel
const COMMAND_QUEUE_CAPACITY: usize = 16;

/// The fixture component, ready to start.
///
/// Generic over the sampler only; events leave through the host-provided
/// [`EventSink`], so the component never knows what bus sits behind it.
pub struct FixtureComponent<S> {
    identity: ComponentIdentity,
    config: ComponentConfig,
    log_settings: LogBatchSettings,
    sampler: Arc<S>,
    events: EventSink,
}

impl<S> FixtureComponent<S>
where
    S: MetricSampler + Sync + 'static,
{
    /// Create a component from its parts
    pub fn new(
        identity: ComponentIdentity,
        config: ComponentConfig,
        log_settings: LogBatchSettings,
        sampler: S,
        events: EventSink,
    ) -> Self {
        Self {
            identity,
            config,
            log_settings,
            sampler: Arc::new(sampler),
            events,
        }
    }

    /// Create a component from a loaded blueprint
    pub fn from_blueprint(blueprint: &ComponentBlueprint, sampler: S, events: EventSink) -> Self {
        Self::new(
            blueprint.component.clone(),
            blueprint.cfg.clone(),
            blueprint.logs.clone(),
            sampler,
            events,
        )
    }

    /// Shared handle to the sampler; grab one before `start` to drive a
    /// scripted sampler from a test
    pub fn sampler(&self) -> Arc<S> {
        Arc::clone(&self.sampler)
    }

    /// Publish the retained snapshots and spawn all component tasks
    pub fn start(self) -> ComponentHandle {
        let topics = TopicScheme::for_component(&self.identity.base_topic, &self.identity.id);
        let config = ConfigStore::new(self.config);
        let states = StateRegistry::new(config.metric_ids());
        let retained = RetainedPublisher::new(self.events.clone(), topics.clone());

        // Retained snapshots first, so subscribers see the descriptors
        // before any stream event arrives.
        retained.publish_metadata(&metadata(&self.identity, &config));
        retained.publish_status(&ComponentStatus::running());
        retained.publish_state(&states.snapshot());
        retained.publish_cfg(&config.snapshot());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let (log, batcher_task) = LogBatcher::spawn(
            self.log_settings,
            config.clone(),
            self.events.clone(),
            topics.logs(),
            shutdown_rx.clone(),
        );

        let scheduler = TelemetryScheduler::spawn(
            self.sampler,
            config.clone(),
            states.clone(),
            self.events.clone(),
            topics.clone(),
            log.clone(),
            shutdown_rx.clone(),
        );

        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let router_task = CommandRouter::spawn(
            command_rx,
            config.clone(),
            states.clone(),
            retained.clone(),
            topics.clone(),
            self.events.clone(),
            log.clone(),
            shutdown_rx,
        );

        log.info(format!("component '{}' started", self.identity.id));
        info!(
            component = %self.identity.id,
            base_topic = %topics.base(),
            metrics = scheduler.len(),
            "Component started"
        );

        ComponentHandle {
            topics,
            config,
            states,
            log,
            retained,
            commands: command_tx,
            shutdown: shutdown_tx,
            scheduler,
            tasks: vec![batcher_task, router_task],
        }
    }
}

/// Build the static metadata descriptor
fn metadata(identity: &ComponentIdentity, config: &ConfigStore) -> ComponentMetadata {
    let mut metrics = config.metric_ids();
    metrics.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ComponentMetadata {
        component_id: identity.id.clone(),
        description: identity.description.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        capabilities: vec!["reset".into(), "ping".into(), "cfg/set".into()],
        metrics,
    }
}

/// Handle to a running component
pub struct ComponentHandle {
    topics: TopicScheme,
    config: ConfigStore,
    states: StateRegistry,
    log: LogBatcher,
    retained: RetainedPublisher,
    commands: mpsc::Sender<CommandRequest>,
    shutdown: watch::Sender<bool>,
    scheduler: TelemetryScheduler,
    tasks: Vec<JoinHandle<()>>,
}

impl ComponentHandle {
    /// The component's topic scheme
    pub fn topics(&self) -> &TopicScheme {
        &self.topics
    }

    /// Snapshot of the current configuration
    pub fn config_snapshot(&self) -> ComponentConfig {
        self.config.snapshot()
    }

    /// Snapshot of the per-metric state
    pub fn state_snapshot(&self) -> BTreeMap<String, MetricState> {
        self.states.snapshot()
    }

    /// Handle for enqueueing log records onto the logs stream
    pub fn logger(&self) -> LogBatcher {
        self.log.clone()
    }

    /// Submit a command for asynchronous processing
    ///
    /// # Errors
    /// `ComponentError::ChannelClosed` when the router has stopped.
    pub async fn send_command(&self, request: CommandRequest) -> Result<(), ComponentError> {
        self.commands
            .send(request)
            .await
            .map_err(|_| ComponentError::ChannelClosed("command router".into()))
    }

    /// Signal shutdown, join all tasks, and publish the stopped status.
    ///
    /// The open log batch is flushed best-effort before teardown completes.
    pub async fn shutdown(self) {
        info!(base_topic = %self.topics.base(), "Component shutting down");
        let _ = self.shutdown.send(true);

        self.scheduler.join().await;
        for task in self.tasks {
            if let Err(e) = task.await {
                error!(error = ?e, "Component task panicked");
            }
        }

        self.retained.publish_status(&ComponentStatus::stopped());
        info!(base_topic = %self.topics.base(), "Component stopped");
    }
}
