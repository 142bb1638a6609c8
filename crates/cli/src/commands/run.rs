//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use component::FixtureComponent;
use contracts::{ComponentBlueprint, MetricSampler};
use dispatcher::{spawn_publishers, DispatcherWorkers, EventDispatcher, MetricsSnapshot};
use sampler::{MockSampler, SystemSampler};

use crate::cli::{RunArgs, SamplerKind};

/// Execute the `run` command
pub async fn run_component(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading blueprint");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Blueprint file not found: {}", args.config.display());
    }

    // Load and parse blueprint
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load blueprint from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref base_topic) = args.base_topic {
        info!(base_topic = %base_topic, "Overriding base topic from CLI");
        blueprint.component.base_topic = base_topic.clone();
    }

    info!(
        component = %blueprint.component.id,
        base_topic = %blueprint.component.base_topic,
        metrics = blueprint.cfg.telemetry.metrics.len(),
        publishers = blueprint.publishers.len(),
        "Blueprint loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - blueprint is valid, exiting");
        print_blueprint_summary(&blueprint);
        return Ok(());
    }

    // Initialize metrics endpoint (optional)
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    if blueprint.publishers.is_empty() {
        warn!("No publishers configured - events will be dropped");
    }

    let (dispatcher, workers) =
        spawn_publishers(&blueprint.publishers).context("Failed to create publishers")?;

    info!(sampler = ?args.sampler, "Starting component...");

    match args.sampler {
        SamplerKind::System => {
            run_with_sampler(&blueprint, SystemSampler::new(), dispatcher, workers, args).await
        }
        SamplerKind::Mock => {
            run_with_sampler(
                &blueprint,
                MockSampler::with_defaults(),
                dispatcher,
                workers,
                args,
            )
            .await
        }
    }
}

/// Run the component with a concrete sampler until the duration elapses or a
/// shutdown signal arrives
async fn run_with_sampler<S>(
    blueprint: &ComponentBlueprint,
    sampler: S,
    dispatcher: EventDispatcher,
    workers: DispatcherWorkers,
    args: &RunArgs,
) -> Result<()>
where
    S: MetricSampler + Sync + 'static,
{
    let start_time = Instant::now();
    let handle = FixtureComponent::from_blueprint(blueprint, sampler, dispatcher.sink()).start();

    let shutdown_signal = setup_shutdown_signal();

    if args.duration > 0 {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(args.duration)) => {
                info!(duration_secs = args.duration, "Run duration elapsed");
            }
            _ = shutdown_signal => {
                warn!("Received shutdown signal, stopping component...");
            }
        }
    } else {
        shutdown_signal.await;
        warn!("Received shutdown signal, stopping component...");
    }

    handle.shutdown().await;

    // Drop our dispatcher clone so the workers can drain and stop
    let publisher_stats = dispatcher.metrics();
    drop(dispatcher);
    workers.join().await;

    print_run_summary(&publisher_stats, start_time.elapsed());

    info!("procsim finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print blueprint summary for dry-run mode
fn print_blueprint_summary(blueprint: &ComponentBlueprint) {
    println!("\n=== Blueprint Summary ===\n");
    println!("Component:");
    println!("  Id: {}", blueprint.component.id);
    println!("  Base topic: {}", blueprint.component.base_topic);

    println!("\nMetrics ({}):", blueprint.cfg.telemetry.metrics.len());
    for (metric, config) in &blueprint.cfg.telemetry.metrics {
        println!(
            "  - {} (enabled: {}, every {}s, threshold {}%)",
            metric, config.enabled, config.interval_s, config.change_threshold_percent
        );
    }

    println!("\nLogs:");
    println!("  Enabled: {}", blueprint.cfg.logs_enabled);
    println!(
        "  Batch: {} records / {}s",
        blueprint.logs.max_batch_size, blueprint.logs.max_batch_age_s
    );

    if !blueprint.publishers.is_empty() {
        println!("\nPublishers ({}):", blueprint.publishers.len());
        for publisher in &blueprint.publishers {
            println!("  - {} ({:?})", publisher.name, publisher.publisher_type);
        }
    }

    println!();
}

/// Print end-of-run publisher statistics
fn print_run_summary(publisher_stats: &[(String, MetricsSnapshot)], duration: Duration) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Component Statistics                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📊 Overview");
    println!("   ├─ Duration: {:.2}s", duration.as_secs_f64());
    println!("   └─ Publishers: {}", publisher_stats.len());

    if !publisher_stats.is_empty() {
        println!("\n📤 Publishers");
        for (i, (name, snapshot)) in publisher_stats.iter().enumerate() {
            let prefix = if i == publisher_stats.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!(
                "   {} {}: published={} failures={} dropped={}",
                prefix, name, snapshot.publish_count, snapshot.failure_count, snapshot.dropped_count
            );
        }
    }

    println!();
}
