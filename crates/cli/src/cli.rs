//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// procsim - fixture process-monitor component
#[derive(Parser, Debug)]
#[command(
    name = "procsim",
    author,
    version,
    about = "Fixture process-monitor component",
    long_about = "A fixture component simulating a monitored process.\n\n\
                  Samples CPU utilization and load average, publishes them as \n\
                  change-gated telemetry events, streams its own logs in \n\
                  rate-limited batches, and answers a small command set."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "PROCSIM_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "PROCSIM_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the fixture component
    Run(RunArgs),

    /// Validate a blueprint file without running
    Validate(ValidateArgs),

    /// Display blueprint information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to blueprint file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "PROCSIM_CONFIG")]
    pub config: PathBuf,

    /// Override the base topic from the blueprint
    #[arg(long, env = "PROCSIM_BASE_TOPIC")]
    pub base_topic: Option<String>,

    /// Metric reading source
    #[arg(long, value_enum, default_value = "system", env = "PROCSIM_SAMPLER")]
    pub sampler: SamplerKind,

    /// Run duration in seconds (0 = run until Ctrl+C)
    #[arg(long, default_value = "0", env = "PROCSIM_DURATION")]
    pub duration: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "PROCSIM_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate the blueprint and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Metric reading source for the `run` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SamplerKind {
    /// Real host readings via sysinfo
    System,
    /// Deterministic wave generator (no host dependency)
    Mock,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to blueprint file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to blueprint file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed per-metric gating configuration
    #[arg(long)]
    pub metrics: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// JSON structured logs
    Json,
    /// Human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
}
