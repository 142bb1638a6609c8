//! Mock Component Demo
//!
//! Runs the fixture component over the deterministic mock sampler and a log
//! publisher, sends the whole command set, and shuts down. No host metrics
//! or bus required.
//!
//! Run with: cargo run --bin mock_component

use std::time::Duration;

use component::FixtureComponent;
use contracts::{CommandRequest, ComponentConfig, ComponentIdentity, LogBatchSettings};
use dispatcher::publishers::LogPublisher;
use dispatcher::EventDispatcher;
use sampler::MockSampler;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Mock Component Demo");

    // ==== Stage 1: Publisher fan-out ====
    let (dispatcher, workers) = EventDispatcher::single(LogPublisher::new("demo_log"), 100);

    // ==== Stage 2: Component over the mock sampler ====
    let identity = ComponentIdentity {
        id: "fixture_cpu".into(),
        base_topic: "procsim/agents/demo".into(),
        description: "mock-driven CPU fixture".into(),
    };

    let handle = FixtureComponent::new(
        identity,
        ComponentConfig::fixture_cpu(),
        LogBatchSettings::default(),
        MockSampler::with_defaults(),
        dispatcher.sink(),
    )
    .start();

    // ==== Stage 3: Let telemetry flow, then exercise the command set ====
    tokio::time::sleep(Duration::from_secs(5)).await;

    handle.send_command(CommandRequest::new("ping")).await?;
    handle.send_command(CommandRequest::new("reset")).await?;
    handle
        .send_command(CommandRequest::with_payload(
            "cfg/set",
            json!({"set": {"telemetry": {"metrics": {
                "cpu_percent": {"change_threshold_percent": 0.0}
            }}}}),
        ))
        .await?;

    tokio::time::sleep(Duration::from_secs(5)).await;

    tracing::info!(
        state = ?handle.state_snapshot(),
        "Final metric state before shutdown"
    );

    // ==== Stage 4: Shutdown ====
    handle.shutdown().await;
    drop(dispatcher);
    workers.join().await;

    tracing::info!("Mock component demo finished");
    Ok(())
}
