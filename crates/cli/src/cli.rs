//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Scenario Runner - LowVisibilityNightDriving driving scenario harness
#[derive(Parser, Debug)]
#[command(
    name = "scenario-runner",
    author,
    version,
    about = "Low visibility night driving scenario runner",
    long_about = "Runs the LowVisibilityNightDriving scenario against an in-process world.\n\n\
                  Loads a scenario configuration, spawns the ego fleet, applies the night \n\
                  weather, places traffic ahead of the ego and evaluates collision and \n\
                  timeout criteria until the scenario fails or is stopped."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SCENARIO_RUNNER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SCENARIO_RUNNER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scenario
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "scenario.toml",
        env = "SCENARIO_RUNNER_CONFIG"
    )]
    pub config: PathBuf,

    /// Stop after this many ticks, overrides `simulation.max_ticks`
    #[arg(long, env = "SCENARIO_RUNNER_MAX_TICKS")]
    pub max_ticks: Option<u64>,

    /// Pace ticks to wall-clock time instead of running flat out
    #[arg(long)]
    pub realtime: bool,

    /// Do not register termination criteria
    #[arg(long)]
    pub no_criteria: bool,

    /// Draw auxiliary blueprints from `population.blueprint_pool`
    #[arg(long)]
    pub randomize: bool,

    /// Log the behavior tree after every tick
    #[arg(long)]
    pub debug: bool,

    /// Prometheus metrics port (0 or absent = disabled)
    #[arg(long, env = "SCENARIO_RUNNER_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "scenario.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "scenario.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
