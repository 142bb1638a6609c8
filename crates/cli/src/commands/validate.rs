//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<BlueprintSummary>,
}

#[derive(Serialize)]
struct BlueprintSummary {
    version: String,
    component_id: String,
    base_topic: String,
    metric_count: usize,
    publisher_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating blueprint");

    let result = validate_blueprint(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Blueprint validation failed")
    }
}

fn validate_blueprint(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(BlueprintSummary {
                    version: format!("{:?}", blueprint.version),
                    component_id: blueprint.component.id.clone(),
                    base_topic: blueprint.component.base_topic.clone(),
                    metric_count: blueprint.cfg.telemetry.metrics.len(),
                    publisher_count: blueprint.publishers.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect blueprint warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::ComponentBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.publishers.is_empty() {
        warnings.push("No publishers configured - events will be dropped".to_string());
    }

    if !blueprint.cfg.logs_enabled {
        warnings.push("logs_enabled is false - log batches will be discarded".to_string());
    }

    for (metric, config) in &blueprint.cfg.telemetry.metrics {
        if !config.enabled {
            warnings.push(format!("Metric '{}' is disabled", metric));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Blueprint is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Component: {}", summary.component_id);
            println!("  Base topic: {}", summary.base_topic);
            println!("  Metrics: {}", summary.metric_count);
            println!("  Publishers: {}", summary.publisher_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Blueprint is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
