//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Blueprint info for JSON output
#[derive(Serialize)]
struct BlueprintInfo {
    version: String,
    component: ComponentInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    metrics: Vec<MetricInfo>,
    logs: LogsInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    publishers: Vec<PublisherInfo>,
}

#[derive(Serialize)]
struct ComponentInfo {
    id: String,
    base_topic: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
}

#[derive(Serialize)]
struct MetricInfo {
    metric: String,
    enabled: bool,
    interval_s: f64,
    change_threshold_percent: f64,
}

#[derive(Serialize)]
struct LogsInfo {
    enabled: bool,
    max_batch_size: usize,
    max_batch_age_s: f64,
}

#[derive(Serialize)]
struct PublisherInfo {
    name: String,
    publisher_type: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading blueprint info");

    if !args.config.exists() {
        anyhow::bail!("Blueprint file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load blueprint from {}", args.config.display()))?;

    if args.json {
        let info = build_blueprint_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize blueprint info")?;
        println!("{}", json);
    } else {
        print_blueprint_info(&blueprint, args);
    }

    Ok(())
}

fn build_blueprint_info(blueprint: &contracts::ComponentBlueprint, args: &InfoArgs) -> BlueprintInfo {
    let metrics = if args.metrics {
        let mut metrics: Vec<MetricInfo> = blueprint
            .cfg
            .telemetry
            .metrics
            .iter()
            .map(|(metric, config)| MetricInfo {
                metric: metric.to_string(),
                enabled: config.enabled,
                interval_s: config.interval_s,
                change_threshold_percent: config.change_threshold_percent,
            })
            .collect();
        metrics.sort_by(|a, b| a.metric.cmp(&b.metric));
        metrics
    } else {
        Vec::new()
    };

    let publishers = blueprint
        .publishers
        .iter()
        .map(|publisher| PublisherInfo {
            name: publisher.name.clone(),
            publisher_type: format!("{:?}", publisher.publisher_type),
        })
        .collect();

    BlueprintInfo {
        version: format!("{:?}", blueprint.version),
        component: ComponentInfo {
            id: blueprint.component.id.clone(),
            base_topic: blueprint.component.base_topic.clone(),
            description: blueprint.component.description.clone(),
        },
        metrics,
        logs: LogsInfo {
            enabled: blueprint.cfg.logs_enabled,
            max_batch_size: blueprint.logs.max_batch_size,
            max_batch_age_s: blueprint.logs.max_batch_age_s,
        },
        publishers,
    }
}

fn print_blueprint_info(blueprint: &contracts::ComponentBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                   procsim Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Component info
    println!("🧩 Component");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Id: {}", blueprint.component.id);
    println!("   ├─ Base topic: {}", blueprint.component.base_topic);
    if blueprint.component.description.is_empty() {
        println!("   └─ Description: (none)");
    } else {
        println!("   └─ Description: {}", blueprint.component.description);
    }

    // Metrics
    let mut metric_names: Vec<_> = blueprint.cfg.telemetry.metrics.keys().collect();
    metric_names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    println!("\n📈 Metrics ({})", metric_names.len());
    for (i, metric) in metric_names.iter().enumerate() {
        let is_last = i == metric_names.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let config = &blueprint.cfg.telemetry.metrics[metric.as_str()];

        if args.metrics {
            println!(
                "   {} {} (enabled: {}, every {}s, threshold {}%)",
                prefix, metric, config.enabled, config.interval_s, config.change_threshold_percent
            );
        } else {
            println!("   {} {}", prefix, metric);
        }
    }

    // Logs
    println!("\n📜 Logs");
    println!("   ├─ Enabled: {}", blueprint.cfg.logs_enabled);
    println!("   ├─ Max batch size: {}", blueprint.logs.max_batch_size);
    println!("   └─ Max batch age: {}s", blueprint.logs.max_batch_age_s);

    // Publishers
    if !blueprint.publishers.is_empty() {
        println!("\n📤 Publishers ({})", blueprint.publishers.len());
        for (i, publisher) in blueprint.publishers.iter().enumerate() {
            let is_last = i == blueprint.publishers.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!(
                "   {} {} ({:?})",
                prefix, publisher.name, publisher.publisher_type
            );
        }
    }

    println!();
}
